pub mod domain;
pub mod ports;
pub mod reconcile;
pub mod slug;

pub use domain::{Article, ArticleLink, ArticlePatch, ArticleStatus, CanvasMode, NewArticle};
pub use ports::{ArticleFilter, ArticleStore, PortError, PortResult};
pub use reconcile::{reconcile, Reconciliation};
