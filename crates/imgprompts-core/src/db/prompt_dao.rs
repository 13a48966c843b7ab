//! 提示词数据访问层
//!
//! 所有读取路径都带 `deleted_at IS NULL` 条件；
//! 只有 `count_prompts_unscoped` 与 `purge_deleted_prompts` 会看到软删除的记录。

use std::collections::HashMap;

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::prompt::{join_image_urls, normalize_structure_analysis};
use crate::models::{
    now_iso8601, CreatePrompt, DuplicateCheck, ModelCount, PaginatedResult, PaginationParams,
    Prompt, PromptFilter, PromptSortOptions, PromptStats, Tag, UpdatePrompt,
};
use crate::utils::error::{AppError, AppResult};
use crate::utils::sanitize::like_pattern;

use super::connection::Database;
use super::tag_dao::{get_or_create_tags_in, row_to_tag};

/// 最近提示词默认数量
pub const DEFAULT_RECENT_LIMIT: u32 = 10;
/// 最近提示词最大数量
pub const MAX_RECENT_LIMIT: u32 = 50;

const PROMPT_COLUMNS: &str = "p.id, p.created_at, p.updated_at, p.deleted_at, p.prompt_text, \
     p.negative_prompt, p.model_name, p.input_image_url, p.output_image_url, p.is_public, \
     p.style_description, p.usage_scenario, p.atmosphere_description, p.expressive_intent, \
     p.structure_analysis";

/// 从数据库行映射到 Prompt 结构（不含标签）
fn row_to_prompt(row: &Row<'_>) -> rusqlite::Result<Prompt> {
    Ok(Prompt {
        id: row.get("id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        deleted_at: row.get("deleted_at")?,
        prompt_text: row.get("prompt_text")?,
        negative_prompt: row.get("negative_prompt")?,
        model_name: row.get("model_name")?,
        input_image_url: row.get("input_image_url")?,
        output_image_url: row.get("output_image_url")?,
        is_public: row.get("is_public")?,
        style_description: row.get("style_description")?,
        usage_scenario: row.get("usage_scenario")?,
        atmosphere_description: row.get("atmosphere_description")?,
        expressive_intent: row.get("expressive_intent")?,
        structure_analysis: row.get("structure_analysis")?,
        tags: Vec::new(),
    })
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// 批量加载提示词的标签，按关联顺序
fn load_tags(conn: &Connection, prompt_ids: &[i64]) -> AppResult<HashMap<i64, Vec<Tag>>> {
    let mut map: HashMap<i64, Vec<Tag>> = HashMap::new();
    if prompt_ids.is_empty() {
        return Ok(map);
    }

    let sql = format!(
        r#"
        SELECT pt.prompt_id, t.id, t.name, t.created_at
        FROM prompt_tags pt
        JOIN tags t ON t.id = pt.tag_id
        WHERE pt.prompt_id IN ({})
        ORDER BY pt.rowid
        "#,
        placeholders(prompt_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(prompt_ids.iter()), |row| {
        Ok((row.get::<_, i64>("prompt_id")?, row_to_tag(row)?))
    })?;

    for row in rows {
        let (prompt_id, tag) = row?;
        map.entry(prompt_id).or_default().push(tag);
    }

    Ok(map)
}

fn attach_tags(conn: &Connection, mut prompts: Vec<Prompt>) -> AppResult<Vec<Prompt>> {
    let ids: Vec<i64> = prompts.iter().map(|p| p.id).collect();
    let mut tags = load_tags(conn, &ids)?;
    for prompt in &mut prompts {
        prompt.tags = tags.remove(&prompt.id).unwrap_or_default();
    }
    Ok(prompts)
}

fn find_prompt(conn: &Connection, id: i64) -> AppResult<Option<Prompt>> {
    let sql = format!(
        "SELECT {} FROM prompts p WHERE p.id = ?1 AND p.deleted_at IS NULL",
        PROMPT_COLUMNS
    );
    let prompt = conn.query_row(&sql, params![id], row_to_prompt).optional()?;

    match prompt {
        Some(p) => Ok(attach_tags(conn, vec![p])?.pop()),
        None => Ok(None),
    }
}

fn get_prompt_in(conn: &Connection, id: i64) -> AppResult<Prompt> {
    find_prompt(conn, id)?.ok_or_else(|| AppError::NotFound("提示词不存在".to_string()))
}

/// 用给定标签名替换提示词的全部标签关联
fn replace_prompt_tags(conn: &Connection, prompt_id: i64, tag_names: &[String]) -> AppResult<()> {
    let tags = get_or_create_tags_in(conn, tag_names)?;

    conn.execute("DELETE FROM prompt_tags WHERE prompt_id = ?1", params![prompt_id])?;

    let mut stmt =
        conn.prepare("INSERT OR IGNORE INTO prompt_tags (prompt_id, tag_id) VALUES (?1, ?2)")?;
    for tag in &tags {
        stmt.execute(params![prompt_id, tag.id])?;
    }

    Ok(())
}

fn validate_prompt_text(text: &str) -> AppResult<()> {
    if text.trim().is_empty() {
        return Err(AppError::Validation("提示词内容不能为空".to_string()));
    }
    Ok(())
}

impl Database {
    // ==================== Prompt CRUD ====================

    /// 创建提示词，标签与提示词在同一事务中写入
    pub fn create_prompt(&self, input: &CreatePrompt) -> AppResult<Prompt> {
        validate_prompt_text(&input.prompt_text)?;

        let prompt = self.transaction(|conn| {
            let now = now_iso8601();
            conn.execute(
                r#"
                INSERT INTO prompts (
                    created_at, updated_at, prompt_text, negative_prompt, model_name,
                    input_image_url, output_image_url, is_public, style_description,
                    usage_scenario, atmosphere_description, expressive_intent, structure_analysis
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                "#,
                params![
                    now,
                    now,
                    input.prompt_text,
                    input.negative_prompt,
                    input.model_name,
                    join_image_urls(&input.input_image_urls),
                    input.output_image_url,
                    input.is_public,
                    input.style_description,
                    input.usage_scenario,
                    input.atmosphere_description,
                    input.expressive_intent,
                    normalize_structure_analysis(&input.structure_analysis),
                ],
            )?;
            let id = conn.last_insert_rowid();

            replace_prompt_tags(conn, id, &input.tag_names)?;

            get_prompt_in(conn, id)
        })?;

        tracing::info!("创建提示词 id={}，标签 {} 个", prompt.id, prompt.tags.len());
        Ok(prompt)
    }

    /// 根据 ID 获取提示词（含标签）
    pub fn get_prompt(&self, id: i64) -> AppResult<Prompt> {
        let conn = self.connection()?;
        get_prompt_in(&conn, id)
    }

    /// 稀疏更新提示词
    ///
    /// `tag_names` 为 `Some` 时整体替换标签关联（空列表即清空），为 `None` 时不动。
    pub fn update_prompt(&self, id: i64, update: &UpdatePrompt) -> AppResult<Prompt> {
        if let Some(ref text) = update.prompt_text {
            validate_prompt_text(text)?;
        }

        self.transaction(|conn| {
            // 确认存在且未删除
            let existing = get_prompt_in(conn, id)?;
            if update.is_empty() {
                return Ok(existing);
            }

            let mut updates: Vec<&str> = Vec::new();
            let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            let text_fields = [
                ("prompt_text = ?", &update.prompt_text),
                ("negative_prompt = ?", &update.negative_prompt),
                ("model_name = ?", &update.model_name),
                ("style_description = ?", &update.style_description),
                ("usage_scenario = ?", &update.usage_scenario),
                ("atmosphere_description = ?", &update.atmosphere_description),
                ("expressive_intent = ?", &update.expressive_intent),
                ("output_image_url = ?", &update.output_image_url),
            ];
            for (clause, value) in text_fields {
                if let Some(v) = value {
                    updates.push(clause);
                    params_vec.push(Box::new(v.clone()));
                }
            }
            if let Some(is_public) = update.is_public {
                updates.push("is_public = ?");
                params_vec.push(Box::new(is_public));
            }
            if let Some(ref raw) = update.structure_analysis {
                updates.push("structure_analysis = ?");
                params_vec.push(Box::new(normalize_structure_analysis(raw)));
            }
            if let Some(ref urls) = update.input_image_urls {
                updates.push("input_image_url = ?");
                params_vec.push(Box::new(join_image_urls(urls)));
            }

            updates.push("updated_at = ?");
            params_vec.push(Box::new(now_iso8601()));
            params_vec.push(Box::new(id));

            let sql = format!("UPDATE prompts SET {} WHERE id = ?", updates.join(", "));
            let params_refs: Vec<&dyn rusqlite::ToSql> =
                params_vec.iter().map(|p| p.as_ref()).collect();
            conn.execute(&sql, params_refs.as_slice())?;

            if let Some(ref tag_names) = update.tag_names {
                replace_prompt_tags(conn, id, tag_names)?;
            }

            get_prompt_in(conn, id)
        })
    }

    /// 软删除提示词
    pub fn delete_prompt(&self, id: i64) -> AppResult<()> {
        let conn = self.connection()?;
        let now = now_iso8601();
        let rows = conn.execute(
            "UPDATE prompts SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
            params![now, id],
        )?;

        if rows == 0 {
            return Err(AppError::NotFound("提示词不存在".to_string()));
        }

        tracing::info!("软删除提示词 id={}", id);
        Ok(())
    }

    // ==================== 查询 ====================

    /// 按条件分页查询提示词
    pub fn list_prompts(
        &self,
        filter: &PromptFilter,
        sort: &PromptSortOptions,
        pagination: &PaginationParams,
    ) -> AppResult<PaginatedResult<Prompt>> {
        let conn = self.connection()?;

        let mut conditions = vec!["p.deleted_at IS NULL".to_string()];
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(model_name) = filter.model_name.as_deref().map(str::trim) {
            if !model_name.is_empty() {
                conditions.push("p.model_name = ?".to_string());
                params_vec.push(Box::new(model_name.to_string()));
            }
        }

        if let Some(is_public) = filter.is_public {
            conditions.push("p.is_public = ?".to_string());
            params_vec.push(Box::new(is_public));
        }

        if let Some(keyword) = filter.keyword.as_deref().map(str::trim) {
            if !keyword.is_empty() {
                conditions.push(
                    "(p.prompt_text LIKE ? ESCAPE '\\' OR p.negative_prompt LIKE ? ESCAPE '\\' \
                     OR p.style_description LIKE ? ESCAPE '\\' OR p.usage_scenario LIKE ? ESCAPE '\\')"
                        .to_string(),
                );
                let pattern = like_pattern(keyword);
                for _ in 0..4 {
                    params_vec.push(Box::new(pattern.clone()));
                }
            }
        }

        let tag_names: Vec<String> = filter
            .tag_names
            .iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        if !tag_names.is_empty() {
            // 子查询避免命中多个标签的提示词被重复计数
            conditions.push(format!(
                "p.id IN (SELECT pt.prompt_id FROM prompt_tags pt JOIN tags t ON t.id = pt.tag_id \
                 WHERE t.name IN ({}))",
                placeholders(tag_names.len())
            ));
            for name in tag_names {
                params_vec.push(Box::new(name));
            }
        }

        let where_clause = conditions.join(" AND ");

        let count_sql = format!("SELECT COUNT(*) FROM prompts p WHERE {}", where_clause);
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        let total: i64 = conn.query_row(&count_sql, params_refs.as_slice(), |row| row.get(0))?;

        let order = sort.order.as_sql();
        let sql = format!(
            "SELECT {} FROM prompts p WHERE {} ORDER BY p.{} {}, p.id {} LIMIT ? OFFSET ?",
            PROMPT_COLUMNS,
            where_clause,
            sort.field.as_column(),
            order,
            order
        );

        params_vec.push(Box::new(pagination.page_size as i64));
        params_vec.push(Box::new(pagination.offset()));
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let prompts = stmt
            .query_map(params_refs.as_slice(), row_to_prompt)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        let prompts = attach_tags(&conn, prompts)?;

        Ok(PaginatedResult::new(prompts, total, pagination))
    }

    /// 公开提示词分页
    pub fn list_public_prompts(
        &self,
        pagination: &PaginationParams,
    ) -> AppResult<PaginatedResult<Prompt>> {
        let filter = PromptFilter {
            is_public: Some(true),
            ..Default::default()
        };
        self.list_prompts(&filter, &PromptSortOptions::default(), pagination)
    }

    /// 按标签名搜索提示词（命中任意一个标签）
    pub fn search_prompts_by_tags(
        &self,
        tag_names: &[String],
        pagination: &PaginationParams,
    ) -> AppResult<PaginatedResult<Prompt>> {
        let filter = PromptFilter {
            tag_names: tag_names.to_vec(),
            ..Default::default()
        };
        self.list_prompts(&filter, &PromptSortOptions::default(), pagination)
    }

    /// 提示词统计
    pub fn prompt_stats(&self) -> AppResult<PromptStats> {
        let conn = self.connection()?;

        let total_prompts: i64 = conn.query_row(
            "SELECT COUNT(*) FROM prompts WHERE deleted_at IS NULL",
            [],
            |row| row.get(0),
        )?;
        let public_prompts: i64 = conn.query_row(
            "SELECT COUNT(*) FROM prompts WHERE deleted_at IS NULL AND is_public = 1",
            [],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(
            r#"
            SELECT model_name, COUNT(*) AS count
            FROM prompts
            WHERE deleted_at IS NULL AND model_name != ''
            GROUP BY model_name
            ORDER BY count DESC, model_name ASC
            "#,
        )?;
        let model_stats = stmt
            .query_map([], |row| {
                Ok(ModelCount {
                    model_name: row.get("model_name")?,
                    count: row.get("count")?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(PromptStats {
            total_prompts,
            public_prompts,
            private_prompts: total_prompts - public_prompts,
            model_stats,
        })
    }

    /// 最近的公开提示词，数量上限 50
    pub fn recent_prompts(&self, limit: u32) -> AppResult<Vec<Prompt>> {
        let limit = if limit == 0 {
            DEFAULT_RECENT_LIMIT
        } else {
            limit.min(MAX_RECENT_LIMIT)
        };

        let conn = self.connection()?;
        let sql = format!(
            "SELECT {} FROM prompts p WHERE p.deleted_at IS NULL AND p.is_public = 1 \
             ORDER BY p.created_at DESC, p.id DESC LIMIT ?1",
            PROMPT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let prompts = stmt
            .query_map(params![limit], row_to_prompt)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        attach_tags(&conn, prompts)
    }

    /// 检查是否存在完全相同的提示词
    pub fn duplicate_check(&self, prompt_text: &str) -> AppResult<DuplicateCheck> {
        let conn = self.connection()?;
        let sql = format!(
            "SELECT {} FROM prompts p WHERE p.deleted_at IS NULL AND p.prompt_text = ?1 \
             ORDER BY p.created_at DESC, p.id DESC",
            PROMPT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let prompts = stmt
            .query_map(params![prompt_text], row_to_prompt)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        let prompts = attach_tags(&conn, prompts)?;

        Ok(DuplicateCheck {
            is_duplicate: !prompts.is_empty(),
            count: prompts.len(),
            prompts: prompts.into_iter().map(Prompt::into_response).collect(),
        })
    }

    // ==================== 维护 ====================

    /// 提示词总行数（包含软删除）
    pub fn count_prompts_unscoped(&self) -> AppResult<i64> {
        let conn = self.connection()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM prompts", [], |row| row.get(0))?)
    }

    /// 物理删除已软删除的提示词及其标签关联，返回删除条数
    pub fn purge_deleted_prompts(&self) -> AppResult<usize> {
        let purged = self.transaction(|conn| {
            conn.execute(
                "DELETE FROM prompt_tags WHERE prompt_id IN (SELECT id FROM prompts WHERE deleted_at IS NOT NULL)",
                [],
            )?;
            Ok(conn.execute("DELETE FROM prompts WHERE deleted_at IS NOT NULL", [])?)
        })?;

        tracing::info!("清理已删除提示词 {} 条", purged);
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PromptSortField, SortOrder};

    fn setup_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.init().unwrap();
        db
    }

    fn new_prompt(text: &str) -> CreatePrompt {
        CreatePrompt {
            prompt_text: text.to_string(),
            ..Default::default()
        }
    }

    fn tag_names(prompt: &Prompt) -> Vec<&str> {
        prompt.tags.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_create_and_get_prompt() {
        let db = setup_db();
        db.create_tag("landscape").unwrap();

        let created = db
            .create_prompt(&CreatePrompt {
                prompt_text: "misty mountains".into(),
                model_name: "sdxl".into(),
                input_image_urls: vec![" http://h/a.png".into(), "".into(), "http://h/b.png".into()],
                structure_analysis: "not json".into(),
                tag_names: vec!["landscape".into(), "nature".into()],
                ..Default::default()
            })
            .unwrap();

        assert_eq!(tag_names(&created), vec!["landscape", "nature"]);
        assert_eq!(created.input_image_urls(), vec!["http://h/a.png", "http://h/b.png"]);
        assert_eq!(created.structure_analysis, "{}");

        let fetched = db.get_prompt(created.id).unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn test_create_prompt_requires_text() {
        let db = setup_db();
        assert!(matches!(
            db.create_prompt(&new_prompt("   ")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_create_prompt_with_invalid_tag_rolls_back() {
        let db = setup_db();
        let input = CreatePrompt {
            prompt_text: "text".into(),
            tag_names: vec!["ok".into(), "x".repeat(101)],
            ..Default::default()
        };
        assert!(db.create_prompt(&input).is_err());
        assert_eq!(db.count_prompts_unscoped().unwrap(), 0);
        assert!(db.get_all_tags().unwrap().is_empty());
    }

    #[test]
    fn test_update_is_sparse() {
        let db = setup_db();
        let created = db
            .create_prompt(&CreatePrompt {
                prompt_text: "original".into(),
                negative_prompt: "blurry".into(),
                model_name: "sd15".into(),
                tag_names: vec!["a".into(), "b".into()],
                ..Default::default()
            })
            .unwrap();

        let updated = db
            .update_prompt(
                created.id,
                &UpdatePrompt {
                    model_name: Some("sdxl".into()),
                    is_public: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.prompt_text, "original");
        assert_eq!(updated.negative_prompt, "blurry");
        assert_eq!(updated.model_name, "sdxl");
        assert!(updated.is_public);
        assert_eq!(tag_names(&updated), vec!["a", "b"]);
    }

    #[test]
    fn test_update_tags_replace_and_clear() {
        let db = setup_db();
        let created = db
            .create_prompt(&CreatePrompt {
                prompt_text: "p".into(),
                tag_names: vec!["a".into(), "b".into()],
                ..Default::default()
            })
            .unwrap();

        let replaced = db
            .update_prompt(
                created.id,
                &UpdatePrompt {
                    tag_names: Some(vec!["c".into(), "a".into()]),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(tag_names(&replaced), vec!["c", "a"]);

        let untouched = db.update_prompt(created.id, &UpdatePrompt::default()).unwrap();
        assert_eq!(tag_names(&untouched), vec!["c", "a"]);

        let cleared = db
            .update_prompt(
                created.id,
                &UpdatePrompt {
                    tag_names: Some(vec![]),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(cleared.tags.is_empty());
        assert!(db.get_prompt(created.id).unwrap().tags.is_empty());
    }

    #[test]
    fn test_update_normalizes_fields() {
        let db = setup_db();
        let created = db.create_prompt(&new_prompt("p")).unwrap();

        let updated = db
            .update_prompt(
                created.id,
                &UpdatePrompt {
                    structure_analysis: Some("".into()),
                    input_image_urls: Some(vec!["u1".into(), " u2 ".into()]),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.structure_analysis, "{}");
        assert_eq!(updated.input_image_url, "u1,u2");

        assert!(matches!(
            db.update_prompt(
                created.id,
                &UpdatePrompt {
                    prompt_text: Some(" ".into()),
                    ..Default::default()
                }
            ),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_update_leaves_prompt_untouched() {
        let db = setup_db();
        let created = db
            .create_prompt(&CreatePrompt {
                prompt_text: "a cat".into(),
                tag_names: vec!["cat".into()],
                ..Default::default()
            })
            .unwrap();
        db.connection()
            .unwrap()
            .execute(
                "UPDATE prompts SET updated_at = '2020-01-01T00:00:00Z' WHERE id = ?1",
                [created.id],
            )
            .unwrap();

        let same = db.update_prompt(created.id, &UpdatePrompt::default()).unwrap();
        assert_eq!(same.updated_at, "2020-01-01T00:00:00Z");
        assert_eq!(same.tags.len(), 1);

        let changed = db
            .update_prompt(
                created.id,
                &UpdatePrompt {
                    tag_names: Some(vec![]),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_ne!(changed.updated_at, "2020-01-01T00:00:00Z");
    }

    #[test]
    fn test_update_missing_prompt() {
        let db = setup_db();
        assert!(matches!(
            db.update_prompt(99, &UpdatePrompt::default()),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_soft_delete() {
        let db = setup_db();
        let created = db.create_prompt(&new_prompt("to delete")).unwrap();

        db.delete_prompt(created.id).unwrap();

        assert!(matches!(db.get_prompt(created.id), Err(AppError::NotFound(_))));
        assert!(matches!(db.delete_prompt(created.id), Err(AppError::NotFound(_))));
        assert_eq!(db.count_prompts_unscoped().unwrap(), 1);

        let listed = db
            .list_prompts(
                &PromptFilter::default(),
                &PromptSortOptions::default(),
                &PaginationParams::default(),
            )
            .unwrap();
        assert_eq!(listed.total, 0);
    }

    #[test]
    fn test_purge_deleted_prompts() {
        let db = setup_db();
        let keep = db.create_prompt(&new_prompt("keep")).unwrap();
        let gone = db
            .create_prompt(&CreatePrompt {
                prompt_text: "gone".into(),
                tag_names: vec!["t".into()],
                ..Default::default()
            })
            .unwrap();
        db.delete_prompt(gone.id).unwrap();

        assert_eq!(db.purge_deleted_prompts().unwrap(), 1);
        assert_eq!(db.count_prompts_unscoped().unwrap(), 1);
        assert!(db.get_prompt(keep.id).is_ok());

        let tag = db.get_tag_by_name("t").unwrap();
        db.delete_tag(tag.id).unwrap();
    }

    #[test]
    fn test_list_filters() {
        let db = setup_db();
        db.create_prompt(&CreatePrompt {
            prompt_text: "sunset over water".into(),
            model_name: "sdxl".into(),
            is_public: true,
            tag_names: vec!["landscape".into(), "warm".into()],
            ..Default::default()
        })
        .unwrap();
        db.create_prompt(&CreatePrompt {
            prompt_text: "portrait of a cat".into(),
            model_name: "sdxl".into(),
            style_description: "oil painting".into(),
            tag_names: vec!["animal".into()],
            ..Default::default()
        })
        .unwrap();
        db.create_prompt(&CreatePrompt {
            prompt_text: "mountain lake".into(),
            model_name: "sd15".into(),
            is_public: true,
            tag_names: vec!["landscape".into()],
            ..Default::default()
        })
        .unwrap();

        let sort = PromptSortOptions::default();
        let page = PaginationParams::default();

        let public = db
            .list_prompts(
                &PromptFilter {
                    is_public: Some(true),
                    ..Default::default()
                },
                &sort,
                &page,
            )
            .unwrap();
        assert_eq!(public.total, 2);
        assert!(public.items.iter().all(|p| p.is_public));

        let intersection = db
            .list_prompts(
                &PromptFilter {
                    model_name: Some("sdxl".into()),
                    tag_names: vec!["landscape".into()],
                    ..Default::default()
                },
                &sort,
                &page,
            )
            .unwrap();
        assert_eq!(intersection.total, 1);
        assert_eq!(intersection.items[0].prompt_text, "sunset over water");

        let by_keyword = db
            .list_prompts(
                &PromptFilter {
                    keyword: Some("OIL".into()),
                    ..Default::default()
                },
                &sort,
                &page,
            )
            .unwrap();
        assert_eq!(by_keyword.total, 1);
        assert_eq!(by_keyword.items[0].prompt_text, "portrait of a cat");
    }

    #[test]
    fn test_tag_filter_does_not_double_count() {
        let db = setup_db();
        db.create_prompt(&CreatePrompt {
            prompt_text: "both".into(),
            tag_names: vec!["a".into(), "b".into()],
            ..Default::default()
        })
        .unwrap();

        let result = db
            .search_prompts_by_tags(&["a".into(), "b".into()], &PaginationParams::default())
            .unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.items.len(), 1);
    }

    #[test]
    fn test_sort_and_pagination() {
        let db = setup_db();
        for i in 0..5 {
            db.create_prompt(&new_prompt(&format!("prompt {}", i))).unwrap();
        }

        let desc = db
            .list_prompts(
                &PromptFilter::default(),
                &PromptSortOptions::default(),
                &PaginationParams::new(1, 2),
            )
            .unwrap();
        assert_eq!(desc.total, 5);
        assert_eq!(desc.total_pages, 3);
        assert_eq!(desc.items[0].prompt_text, "prompt 4");

        let asc = db
            .list_prompts(
                &PromptFilter::default(),
                &PromptSortOptions {
                    field: PromptSortField::CreatedAt,
                    order: SortOrder::Asc,
                },
                &PaginationParams::new(3, 2),
            )
            .unwrap();
        assert_eq!(asc.items.len(), 1);
        assert_eq!(asc.items[0].prompt_text, "prompt 4");
    }

    #[test]
    fn test_stats_recent_and_duplicates() {
        let db = setup_db();
        db.create_prompt(&CreatePrompt {
            prompt_text: "sunset over water".into(),
            model_name: "sdxl".into(),
            is_public: true,
            ..Default::default()
        })
        .unwrap();
        db.create_prompt(&CreatePrompt {
            prompt_text: "city".into(),
            model_name: "sdxl".into(),
            ..Default::default()
        })
        .unwrap();
        db.create_prompt(&new_prompt("no model")).unwrap();

        let stats = db.prompt_stats().unwrap();
        assert_eq!(stats.total_prompts, 3);
        assert_eq!(stats.public_prompts, 1);
        assert_eq!(stats.private_prompts, 2);
        assert_eq!(
            stats.model_stats,
            vec![ModelCount {
                model_name: "sdxl".into(),
                count: 2
            }]
        );

        let recent = db.recent_prompts(100).unwrap();
        assert_eq!(recent.len(), 1);
        assert!(recent[0].is_public);

        let dup = db.duplicate_check("sunset over water").unwrap();
        assert!(dup.is_duplicate);
        assert_eq!(dup.count, 1);

        let none = db.duplicate_check("different text").unwrap();
        assert!(!none.is_duplicate);
        assert_eq!(none.count, 0);
    }
}
