//! 数据库 Schema 定义
//!
//! 包含所有表的 CREATE 语句和迁移脚本

/// 数据库版本
pub const SCHEMA_VERSION: i32 = 2;

/// 初始化 Schema SQL
pub const INIT_SCHEMA: &str = r#"
-- 标签表
CREATE TABLE IF NOT EXISTS tags (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL UNIQUE CHECK(length(name) <= 100),
    created_at      TEXT NOT NULL
);

-- 提示词表
CREATE TABLE IF NOT EXISTS prompts (
    id                      INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at              TEXT NOT NULL,
    updated_at              TEXT NOT NULL,
    deleted_at              TEXT,
    prompt_text             TEXT NOT NULL,
    negative_prompt         TEXT NOT NULL DEFAULT '',
    model_name              TEXT NOT NULL DEFAULT '',
    input_image_url         TEXT NOT NULL DEFAULT '',
    output_image_url        TEXT NOT NULL DEFAULT '',
    is_public               INTEGER NOT NULL DEFAULT 0,
    style_description       TEXT NOT NULL DEFAULT '',
    usage_scenario          TEXT NOT NULL DEFAULT '',
    atmosphere_description  TEXT NOT NULL DEFAULT '',
    expressive_intent       TEXT NOT NULL DEFAULT '',
    structure_analysis      TEXT NOT NULL DEFAULT '{}'
);

-- 提示词-标签关联表
CREATE TABLE IF NOT EXISTS prompt_tags (
    prompt_id       INTEGER NOT NULL REFERENCES prompts(id) ON DELETE CASCADE,
    tag_id          INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (prompt_id, tag_id)
);

-- 版本表
CREATE TABLE IF NOT EXISTS schema_version (
    version         INTEGER PRIMARY KEY,
    applied_at      TEXT NOT NULL
);

-- 索引
CREATE INDEX IF NOT EXISTS idx_prompts_deleted_at ON prompts(deleted_at);
CREATE INDEX IF NOT EXISTS idx_prompts_created_at ON prompts(created_at);
CREATE INDEX IF NOT EXISTS idx_prompts_model_name ON prompts(model_name);
CREATE INDEX IF NOT EXISTS idx_prompts_prompt_text ON prompts(prompt_text);
CREATE INDEX IF NOT EXISTS idx_prompt_tags_tag_id ON prompt_tags(tag_id);
"#;

/// 删除全部表（reset 使用）
pub const DROP_SCHEMA: &str = r#"
DROP TABLE IF EXISTS prompt_tags;
DROP TABLE IF EXISTS prompts;
DROP TABLE IF EXISTS tags;
DROP TABLE IF EXISTS schema_version;
"#;

/// 数据库迁移
pub struct Migration {
    pub version: i32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// 迁移列表
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 2,
    description: "Add lookup indexes for duplicate check and tag usage",
    sql: r#"
            CREATE INDEX IF NOT EXISTS idx_prompts_prompt_text ON prompts(prompt_text);
            CREATE INDEX IF NOT EXISTS idx_prompt_tags_tag_id ON prompt_tags(tag_id);
        "#,
}];
