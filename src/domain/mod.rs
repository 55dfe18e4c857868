pub mod article;
pub mod resource;
pub mod state;

pub use article::{to_articles, Article, ArticleRecord, UNKNOWN_AUTHOR, UNKNOWN_SOURCE};
pub use resource::Resource;
pub use state::{DetailState, HeadlinesState};
