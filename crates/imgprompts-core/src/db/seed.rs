//! 初始数据与数据维护
//!
//! 启动时的初始标签、示例数据，以及关联表完整性检查

use crate::models::CreatePrompt;
use crate::utils::error::AppResult;

use super::connection::Database;

/// 启动时写入的初始标签
pub const INITIAL_TAGS: &[&str] = &[
    "风景", "人物", "动物", "建筑", "抽象", "科幻", "复古", "现代", "暖色调", "冷色调",
];

/// 完整性检查结果
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct IntegrityReport {
    /// 指向不存在提示词的关联
    pub orphan_prompt_links: i64,
    /// 指向不存在标签的关联
    pub orphan_tag_links: i64,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.orphan_prompt_links == 0 && self.orphan_tag_links == 0
    }
}

fn sample_prompts() -> Vec<CreatePrompt> {
    vec![
        CreatePrompt {
            prompt_text: "a beautiful sunset over mountains, golden hour, cinematic lighting, high quality".into(),
            negative_prompt: "ugly, blurry, low quality, pixelated, noise".into(),
            model_name: "stable-diffusion-v1-5".into(),
            output_image_url: "/uploads/sample_sunset.jpg".into(),
            is_public: true,
            style_description: "风景摄影风格，温暖的金色调".into(),
            usage_scenario: "适用于自然风光、旅游宣传、背景图片".into(),
            atmosphere_description: "宁静、温暖、壮观的黄昏氛围".into(),
            expressive_intent: "表现大自然的壮美和宁静".into(),
            structure_analysis: r#"{"主体":"山峰日落","光照":"黄金时刻","质量":"高质量","风格":"电影感"}"#.into(),
            tag_names: vec!["风景".into(), "暖色调".into(), "高质量".into(), "4K".into()],
            ..Default::default()
        },
        CreatePrompt {
            prompt_text: "portrait of a cat, professional photography, studio lighting, detailed fur texture".into(),
            negative_prompt: "cartoon, anime, low resolution, distorted".into(),
            model_name: "stable-diffusion-v1-5".into(),
            output_image_url: "/uploads/sample_cat.jpg".into(),
            is_public: true,
            style_description: "专业摄影风格，细致的毛发质感".into(),
            usage_scenario: "适用于宠物摄影、动物主题设计".into(),
            atmosphere_description: "温馨、可爱、专业的摄影氛围".into(),
            expressive_intent: "突出动物的可爱特征和毛发细节".into(),
            structure_analysis: r#"{"主体":"猫咪肖像","技法":"专业摄影","光照":"工作室灯光","细节":"毛发质感"}"#.into(),
            tag_names: vec!["动物".into(), "现代".into(), "高质量".into()],
            ..Default::default()
        },
        CreatePrompt {
            prompt_text: "futuristic city skyline, neon lights, cyberpunk style, night scene, high-tech architecture".into(),
            negative_prompt: "old, vintage, daylight, low quality".into(),
            model_name: "stable-diffusion-xl".into(),
            output_image_url: "/uploads/sample_cyberpunk.jpg".into(),
            is_public: true,
            style_description: "赛博朋克风格，霓虹灯光效果".into(),
            usage_scenario: "适用于科幻题材、游戏背景、未来主题设计".into(),
            atmosphere_description: "神秘、科技感十足的未来夜景".into(),
            expressive_intent: "展现未来科技城市的繁华与神秘".into(),
            structure_analysis: r#"{"主体":"未来城市","风格":"赛博朋克","光效":"霓虹灯","时间":"夜景"}"#.into(),
            tag_names: vec!["科幻".into(), "现代".into(), "冷色调".into(), "高质量".into()],
            ..Default::default()
        },
    ]
}

impl Database {
    /// 写入初始标签，单个失败只记录日志，返回成功数量
    pub fn seed_initial_tags(&self) -> usize {
        let mut seeded = 0;
        for name in INITIAL_TAGS {
            match self.create_tag(name) {
                Ok(_) => seeded += 1,
                Err(e) => tracing::warn!("初始化标签 {} 失败: {}", name, e),
            }
        }
        tracing::debug!("初始标签就绪 {}/{}", seeded, INITIAL_TAGS.len());
        seeded
    }

    /// 创建示例提示词；已有提示词时跳过，返回创建数量
    pub fn create_sample_data(&self) -> AppResult<usize> {
        let existing = self.prompt_stats()?.total_prompts;
        if existing > 0 {
            tracing::info!("检测到已有 {} 条提示词数据，跳过示例数据创建", existing);
            return Ok(0);
        }

        let mut created = 0;
        for (i, sample) in sample_prompts().iter().enumerate() {
            match self.create_prompt(sample) {
                Ok(_) => created += 1,
                Err(e) => tracing::warn!("创建示例提示词 {} 失败: {}", i + 1, e),
            }
        }

        tracing::info!("示例数据创建完成，共 {} 条", created);
        Ok(created)
    }

    /// 检查关联表中的孤儿记录
    pub fn validate_data(&self) -> AppResult<IntegrityReport> {
        let conn = self.connection()?;

        let orphan_prompt_links: i64 = conn.query_row(
            "SELECT COUNT(*) FROM prompt_tags pt LEFT JOIN prompts p ON p.id = pt.prompt_id WHERE p.id IS NULL",
            [],
            |row| row.get(0),
        )?;
        let orphan_tag_links: i64 = conn.query_row(
            "SELECT COUNT(*) FROM prompt_tags pt LEFT JOIN tags t ON t.id = pt.tag_id WHERE t.id IS NULL",
            [],
            |row| row.get(0),
        )?;

        Ok(IntegrityReport {
            orphan_prompt_links,
            orphan_tag_links,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.init().unwrap();
        db
    }

    #[test]
    fn test_seed_initial_tags_twice() {
        let db = setup_db();
        assert_eq!(db.seed_initial_tags(), INITIAL_TAGS.len());
        assert_eq!(db.seed_initial_tags(), INITIAL_TAGS.len());
        assert_eq!(db.get_all_tags().unwrap().len(), INITIAL_TAGS.len());
    }

    #[test]
    fn test_create_sample_data_only_once() {
        let db = setup_db();
        assert_eq!(db.create_sample_data().unwrap(), 3);
        assert_eq!(db.create_sample_data().unwrap(), 0);

        let stats = db.prompt_stats().unwrap();
        assert_eq!(stats.total_prompts, 3);
        assert_eq!(stats.public_prompts, 3);
        assert_eq!(stats.model_stats[0].model_name, "stable-diffusion-v1-5");
        assert_eq!(stats.model_stats[0].count, 2);
    }

    #[test]
    fn test_validate_data_reports_orphans() {
        let db = setup_db();
        db.create_sample_data().unwrap();
        assert!(db.validate_data().unwrap().is_clean());

        {
            let conn = db.connection().unwrap();
            conn.execute_batch(
                "PRAGMA foreign_keys = OFF; INSERT INTO prompt_tags (prompt_id, tag_id) VALUES (999, 1);",
            )
            .unwrap();
        }

        let report = db.validate_data().unwrap();
        assert_eq!(report.orphan_prompt_links, 1);
        assert_eq!(report.orphan_tag_links, 0);
        assert!(!report.is_clean());
    }
}
