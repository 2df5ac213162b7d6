// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod options;
pub mod payload;
pub mod results;
pub mod scraper;
pub mod session;
pub mod task;

pub use options::{OutputFormat, ScrapeOptions};
pub use payload::{ExtractorSpec, FieldSpec, PaginatorSpec, Payload};
pub use results::{Block, Results};
pub use self::scraper::{Part, Scraper};
pub use session::Session;
pub use task::{Task, TaskStatus};
