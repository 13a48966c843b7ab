//! imgprompts 数据库模块
//!
//! 包含数据库连接管理和数据访问层

pub mod connection;
pub mod prompt_dao;
pub mod schema;
pub mod seed;
pub mod tag_dao;

// 重新导出常用类型
pub use connection::{Database, DatabaseStats};
pub use prompt_dao::{DEFAULT_RECENT_LIMIT, MAX_RECENT_LIMIT};
pub use seed::{IntegrityReport, INITIAL_TAGS};
