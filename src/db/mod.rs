//! Database connection and repositories.

use anyhow::Result;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

pub mod architectures;
pub mod checklist_items;
pub mod coding_rules;
pub mod conventions;
pub mod layers;
pub mod modules;
pub mod rule_examples;
pub mod schema;
pub mod templates;
pub mod zero_tolerance;

pub use architectures::{
    ArchitectureCriteria, ArchitectureRecord, ArchitectureRepository, ArchitectureSearchField,
    CreateArchitecture,
};
pub use checklist_items::{ChecklistItemRecord, ChecklistItemRepository, CreateChecklistItem};
pub use coding_rules::{
    CodingRuleCriteria, CodingRuleRecord, CodingRuleRepository, CodingRuleSearchField,
    CreateCodingRule, RuleSeverity, UpdateCodingRule,
};
pub use conventions::{
    ConventionCriteria, ConventionRecord, ConventionRepository, ConventionSearchField,
    CreateConvention, RuleCategory,
};
pub use layers::{CreateLayer, LayerCriteria, LayerRecord, LayerRepository, LayerSearchField};
pub use modules::{CreateModule, ModuleRecord, ModuleRepository};
pub use rule_examples::{CreateRuleExample, ExampleKind, RuleExampleRecord, RuleExampleRepository};
pub use templates::{
    CreateTemplate, TemplateCriteria, TemplateKind, TemplateRecord, TemplateRepository,
    TemplateSearchField, UpdateTemplate,
};
pub use zero_tolerance::{CreateZeroTolerance, ZeroToleranceRecord, ZeroToleranceRepository};

/// Database wrapper providing connection pool access
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database wrapper from an existing pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the maximum connection pool size from environment or default
    fn get_max_connections() -> u32 {
        std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10)
    }

    /// Create a new database connection pool
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(Self::get_max_connections())
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create any missing tables and indexes
    pub async fn init_schema(&self) -> Result<()> {
        schema::init_schema(&self.pool).await?;
        Ok(())
    }

    pub fn architectures(&self) -> ArchitectureRepository {
        ArchitectureRepository::new(self.pool.clone())
    }

    pub fn layers(&self) -> LayerRepository {
        LayerRepository::new(self.pool.clone())
    }

    pub fn modules(&self) -> ModuleRepository {
        ModuleRepository::new(self.pool.clone())
    }

    pub fn conventions(&self) -> ConventionRepository {
        ConventionRepository::new(self.pool.clone())
    }

    pub fn coding_rules(&self) -> CodingRuleRepository {
        CodingRuleRepository::new(self.pool.clone())
    }

    pub fn checklist_items(&self) -> ChecklistItemRepository {
        ChecklistItemRepository::new(self.pool.clone())
    }

    pub fn zero_tolerance(&self) -> ZeroToleranceRepository {
        ZeroToleranceRepository::new(self.pool.clone())
    }

    pub fn rule_examples(&self) -> RuleExampleRepository {
        RuleExampleRepository::new(self.pool.clone())
    }

    pub fn templates(&self) -> TemplateRepository {
        TemplateRepository::new(self.pool.clone())
    }
}
