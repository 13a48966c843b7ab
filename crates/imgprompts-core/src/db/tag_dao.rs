//! 标签数据访问层

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{now_iso8601, Tag, TagStats, TagUsage};
use crate::utils::error::{is_unique_violation, AppError, AppResult};
use crate::utils::sanitize::like_pattern;

use super::connection::Database;

/// 热门标签数量
pub const POPULAR_TAG_LIMIT: i64 = 10;

/// 从数据库行映射到 Tag 结构
pub(crate) fn row_to_tag(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get("id")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
    })
}

fn find_tag_by_name(conn: &Connection, name: &str) -> rusqlite::Result<Option<Tag>> {
    conn.query_row(
        "SELECT id, name, created_at FROM tags WHERE name = ?1",
        params![name],
        row_to_tag,
    )
    .optional()
}

/// 获取或创建单个标签（名称需已规整）
pub(crate) fn get_or_create_tag_in(conn: &Connection, name: &str) -> AppResult<Tag> {
    match find_tag_by_name(conn, name)? {
        Some(tag) => Ok(tag),
        None => insert_tag_in(conn, name),
    }
}

/// 插入标签
///
/// 并发插入同名标签时会触发唯一约束，此时重新按名称读取已有记录。
fn insert_tag_in(conn: &Connection, name: &str) -> AppResult<Tag> {
    let now = now_iso8601();
    match conn.execute(
        "INSERT INTO tags (name, created_at) VALUES (?1, ?2)",
        params![name, now],
    ) {
        Ok(_) => Ok(Tag {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            created_at: now,
        }),
        Err(e) if is_unique_violation(&e) => {
            tracing::debug!("标签 {} 已被并发创建，重新读取", name);
            find_tag_by_name(conn, name)?
                .ok_or_else(|| AppError::General(format!("创建标签 {} 失败", name)))
        }
        Err(e) => Err(AppError::Database(e)),
    }
}

/// 批量获取或创建标签，保持输入顺序，跳过空白名称
pub(crate) fn get_or_create_tags_in(conn: &Connection, names: &[String]) -> AppResult<Vec<Tag>> {
    let mut tags = Vec::with_capacity(names.len());
    for name in names {
        if name.trim().is_empty() {
            continue;
        }
        let name = Tag::normalize_name(name)?;
        tags.push(get_or_create_tag_in(conn, &name)?);
    }
    Ok(tags)
}

impl Database {
    // ==================== Tag CRUD ====================

    /// 创建标签；同名标签已存在时直接返回已有标签
    pub fn create_tag(&self, name: &str) -> AppResult<Tag> {
        let name = Tag::normalize_name(name)?;
        let conn = self.connection()?;
        let tag = get_or_create_tag_in(&conn, &name)?;
        tracing::debug!("标签就绪: {} (id={})", tag.name, tag.id);
        Ok(tag)
    }

    /// 批量获取或创建标签
    pub fn get_or_create_tags(&self, names: &[String]) -> AppResult<Vec<Tag>> {
        self.transaction(|conn| get_or_create_tags_in(conn, names))
    }

    /// 根据 ID 获取标签
    pub fn get_tag(&self, id: i64) -> AppResult<Tag> {
        let conn = self.connection()?;

        conn.query_row(
            "SELECT id, name, created_at FROM tags WHERE id = ?1",
            params![id],
            row_to_tag,
        )
        .optional()?
        .ok_or_else(|| AppError::NotFound("标签不存在".to_string()))
    }

    /// 根据名称获取标签
    pub fn get_tag_by_name(&self, name: &str) -> AppResult<Tag> {
        let conn = self.connection()?;
        find_tag_by_name(&conn, name.trim())?
            .ok_or_else(|| AppError::NotFound("标签不存在".to_string()))
    }

    /// 获取所有标签（按名称升序）
    pub fn get_all_tags(&self) -> AppResult<Vec<Tag>> {
        let conn = self.connection()?;

        let mut stmt = conn.prepare("SELECT id, name, created_at FROM tags ORDER BY name ASC")?;
        let tags = stmt
            .query_map([], row_to_tag)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(tags)
    }

    /// 按名称子串搜索标签，关键词为空时返回全部
    pub fn search_tags(&self, keyword: &str) -> AppResult<Vec<Tag>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return self.get_all_tags();
        }

        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, created_at FROM tags WHERE name LIKE ?1 ESCAPE '\\' ORDER BY name ASC",
        )?;
        let tags = stmt
            .query_map(params![like_pattern(keyword)], row_to_tag)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(tags)
    }

    /// 删除标签
    ///
    /// 仍有提示词引用时返回 `Conflict`（包含软删除但未清理的提示词）。
    pub fn delete_tag(&self, id: i64) -> AppResult<()> {
        self.transaction(|conn| {
            let exists: bool = conn.query_row(
                "SELECT COUNT(*) > 0 FROM tags WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )?;
            if !exists {
                return Err(AppError::NotFound("标签不存在".to_string()));
            }

            let in_use: i64 = conn.query_row(
                "SELECT COUNT(*) FROM prompt_tags WHERE tag_id = ?1",
                params![id],
                |row| row.get(0),
            )?;
            if in_use > 0 {
                return Err(AppError::Conflict(format!(
                    "无法删除标签，还有 {} 个提示词在使用此标签",
                    in_use
                )));
            }

            conn.execute("DELETE FROM tags WHERE id = ?1", params![id])?;
            tracing::info!("删除标签 id={}", id);
            Ok(())
        })
    }

    /// 标签统计：总数与使用次数最多的标签
    pub fn tag_stats(&self) -> AppResult<TagStats> {
        let conn = self.connection()?;

        let total_tags: i64 = conn.query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT t.id AS tag_id, t.name AS tag_name, COUNT(*) AS use_count
            FROM prompt_tags pt
            JOIN tags t ON t.id = pt.tag_id
            JOIN prompts p ON p.id = pt.prompt_id AND p.deleted_at IS NULL
            GROUP BY t.id
            ORDER BY use_count DESC, t.id ASC
            LIMIT ?1
            "#,
        )?;
        let popular_tags = stmt
            .query_map(params![POPULAR_TAG_LIMIT], |row| {
                Ok(TagUsage {
                    tag_id: row.get("tag_id")?,
                    tag_name: row.get("tag_name")?,
                    use_count: row.get("use_count")?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(TagStats {
            total_tags,
            popular_tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreatePrompt;

    fn setup_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.init().unwrap();
        db
    }

    #[test]
    fn test_create_tag_is_idempotent() {
        let db = setup_db();

        let first = db.create_tag("landscape").unwrap();
        let second = db.create_tag("  landscape ").unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(db.get_all_tags().unwrap().len(), 1);
    }

    #[test]
    fn test_insert_existing_tag_returns_stored_row() {
        let db = setup_db();
        let existing = db.create_tag("portrait").unwrap();

        let conn = db.connection().unwrap();
        let tag = insert_tag_in(&conn, "portrait").unwrap();
        assert_eq!(tag.id, existing.id);
        assert_eq!(tag.created_at, existing.created_at);
        drop(conn);

        assert_eq!(db.get_all_tags().unwrap().len(), 1);
    }

    #[test]
    fn test_create_tag_validation() {
        let db = setup_db();
        assert!(matches!(db.create_tag(""), Err(AppError::Validation(_))));
        assert!(matches!(
            db.create_tag(&"x".repeat(101)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_get_tag_not_found() {
        let db = setup_db();
        assert!(matches!(db.get_tag(42), Err(AppError::NotFound(_))));
        assert!(matches!(db.get_tag_by_name("none"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_get_all_and_search_sorted_by_name() {
        let db = setup_db();
        for name in ["zebra", "apple", "Mango", "snapple"] {
            db.create_tag(name).unwrap();
        }

        let names: Vec<String> = db.get_all_tags().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Mango", "apple", "snapple", "zebra"]);

        let found: Vec<String> = db.search_tags("APPLE").unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(found, vec!["apple", "snapple"]);

        assert_eq!(db.search_tags("  ").unwrap().len(), 4);
    }

    #[test]
    fn test_search_escapes_wildcards() {
        let db = setup_db();
        db.create_tag("50%").unwrap();
        db.create_tag("500").unwrap();

        let found = db.search_tags("0%").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "50%");
    }

    #[test]
    fn test_get_or_create_tags_preserves_order_and_skips_empty() {
        let db = setup_db();
        let existing = db.create_tag("b").unwrap();

        let names = vec!["a".to_string(), " ".to_string(), "b".to_string(), "a".to_string()];
        let tags = db.get_or_create_tags(&names).unwrap();

        let resolved: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(resolved, vec!["a", "b", "a"]);
        assert_eq!(tags[1].id, existing.id);
        assert_eq!(tags[0].id, tags[2].id);
        assert_eq!(db.get_all_tags().unwrap().len(), 2);
    }

    #[test]
    fn test_delete_tag_conflict_and_not_found() {
        let db = setup_db();
        let used = db.create_tag("used").unwrap();
        let unused = db.create_tag("unused").unwrap();

        db.create_prompt(&CreatePrompt {
            prompt_text: "a quiet lake".into(),
            tag_names: vec!["used".into()],
            ..Default::default()
        })
        .unwrap();

        match db.delete_tag(used.id) {
            Err(AppError::Conflict(msg)) => assert!(msg.contains('1')),
            other => panic!("expected conflict, got {:?}", other),
        }

        db.delete_tag(unused.id).unwrap();
        assert!(matches!(db.get_tag(unused.id), Err(AppError::NotFound(_))));
        assert!(matches!(db.delete_tag(unused.id), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_tag_stats_ignores_deleted_prompts() {
        let db = setup_db();
        db.create_tag("lonely").unwrap();

        let kept = db
            .create_prompt(&CreatePrompt {
                prompt_text: "one".into(),
                tag_names: vec!["common".into(), "rare".into()],
                ..Default::default()
            })
            .unwrap();
        let removed = db
            .create_prompt(&CreatePrompt {
                prompt_text: "two".into(),
                tag_names: vec!["common".into(), "rare".into()],
                ..Default::default()
            })
            .unwrap();
        db.create_prompt(&CreatePrompt {
            prompt_text: "three".into(),
            tag_names: vec!["common".into()],
            ..Default::default()
        })
        .unwrap();
        db.delete_prompt(removed.id).unwrap();

        let stats = db.tag_stats().unwrap();
        assert_eq!(stats.total_tags, 3);
        assert_eq!(stats.popular_tags.len(), 2);
        assert_eq!(stats.popular_tags[0].tag_name, "common");
        assert_eq!(stats.popular_tags[0].use_count, 2);
        assert_eq!(stats.popular_tags[1].tag_name, "rare");
        assert_eq!(stats.popular_tags[1].use_count, 1);
        assert!(kept.id > 0);
    }
}
