use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::finding::{ErrorCode, Finding, Findings, ValidationResult};
use super::options::ValidationOptions;
use super::relations::{self, CatalogSnapshot};
use super::rules::{run_rule, RuleContext, RuleOutcome, ValidationRule};
use super::schema::{self, EntityType};
use super::{celestial, part, resource, technology};
use crate::error::{did_you_mean, suggest};
use crate::safe_access::{merge_defaults, type_name, FieldChange};

type RuleSet = BTreeMap<String, Arc<dyn ValidationRule>>;

/// Result of [`DataValidator::auto_fix`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoFixReport {
    pub entity: Value,
    pub fixed: bool,
    pub changes: Vec<FieldChange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Findings for one `type:id`, tagged with the digest of the record they
/// were computed from.
struct CacheEntry {
    digest: Vec<u8>,
    findings: Vec<Finding>,
}

#[derive(Default)]
struct FindingCache {
    entries: HashMap<String, CacheEntry>,
    hits: u64,
    misses: u64,
}

/// Schema and relation validator for catalog records.
///
/// Each instance owns its rule registry and finding cache, so independent
/// validators never observe each other's rules. The cache holds one entry per
/// `type:id`; an entry only answers for a record whose content digest
/// matches, so an edited record or a different record reusing the id is
/// validated afresh and replaces the entry. Registering or removing a rule
/// clears the cache.
#[derive(Default)]
pub struct DataValidator {
    rules: RwLock<HashMap<EntityType, RuleSet>>,
    cache: Mutex<FindingCache>,
}

impl std::fmt::Debug for DataValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataValidator")
            .field("cache", &self.cache_stats())
            .finish_non_exhaustive()
    }
}

impl DataValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate one record as `entity_type`.
    pub fn validate(
        &self,
        entity: &Value,
        entity_type: EntityType,
        options: &ValidationOptions,
    ) -> ValidationResult {
        ValidationResult::assemble(self.raw_findings(entity, entity_type, options), options)
    }

    /// Validate with default options.
    pub fn validate_default(&self, entity: &Value, entity_type: EntityType) -> ValidationResult {
        self.validate(entity, entity_type, &ValidationOptions::default())
    }

    /// Dispatch on a type name such as `"part"` or `"celestialBody"`. An
    /// unknown name yields an invalid result rather than an error.
    pub fn validate_named(
        &self,
        entity: &Value,
        type_name: &str,
        options: &ValidationOptions,
    ) -> ValidationResult {
        match EntityType::parse(type_name) {
            Some(entity_type) => self.validate(entity, entity_type, options),
            None => {
                let suggestions = suggest(type_name, EntityType::ALL.iter().map(|t| t.as_str()));
                let finding = Finding::error(
                    ErrorCode::InvalidValue,
                    "",
                    format!(
                        "Unknown entity type '{type_name}'{}",
                        did_you_mean(&suggestions)
                    ),
                );
                ValidationResult::assemble(vec![finding], options)
            }
        }
    }

    /// Validate a collection. Each finding's path is prefixed with the index
    /// of the entity it belongs to (`[k].mass`). A string id used by an
    /// earlier entity is a constraint violation at `[k].id`.
    pub fn validate_many(
        &self,
        entities: &[Value],
        entity_type: EntityType,
        options: &ValidationOptions,
    ) -> ValidationResult {
        let mut first_use: HashMap<&str, usize> = HashMap::new();
        let mut findings = Vec::new();

        for (index, entity) in entities.iter().enumerate() {
            findings.extend(
                self.raw_findings(entity, entity_type, options)
                    .into_iter()
                    .map(|finding| finding.under_index(index)),
            );

            let Some(id) = entity.get("id").and_then(Value::as_str) else {
                continue;
            };
            match first_use.get(id) {
                Some(&first) => findings.push(
                    Finding::error(
                        ErrorCode::ConstraintViolation,
                        "id",
                        format!("Duplicate {entity_type} id '{id}', first used by [{first}]"),
                    )
                    .under_index(index),
                ),
                None => {
                    first_use.insert(id, index);
                }
            }
        }
        ValidationResult::assemble(findings, options)
    }

    /// Run every cross-entity check over `snapshot`.
    pub fn validate_relations(
        &self,
        snapshot: &CatalogSnapshot<'_>,
        options: &ValidationOptions,
    ) -> ValidationResult {
        let mut out = Findings::new();
        relations::validate_relations(snapshot, &mut out);
        ValidationResult::assemble(out.into_vec(), options)
    }

    /// Fill missing or `null` fields from the schema defaults without touching
    /// present values. Non-object entities are returned unchanged.
    pub fn auto_fix(&self, entity: &Value, entity_type: EntityType) -> AutoFixReport {
        let mut fixed_entity = entity.clone();
        let changes = if fixed_entity.is_object() {
            merge_defaults(&mut fixed_entity, entity_type.defaults())
        } else {
            Vec::new()
        };
        if !changes.is_empty() {
            debug!(entity_type = %entity_type, changes = changes.len(), "auto-fixed entity");
        }
        AutoFixReport {
            entity: fixed_entity,
            fixed: !changes.is_empty(),
            changes,
        }
    }

    /// Register `rule` under `name`, replacing any rule of the same name.
    pub fn add_rule<F>(&self, entity_type: EntityType, name: impl Into<String>, rule: F)
    where
        F: Fn(&Value, &RuleContext<'_>) -> anyhow::Result<RuleOutcome> + Send + Sync + 'static,
    {
        self.register_rule(entity_type, name, Arc::new(rule));
    }

    /// Register a rule implemented as a type rather than a closure.
    pub fn register_rule(
        &self,
        entity_type: EntityType,
        name: impl Into<String>,
        rule: Arc<dyn ValidationRule>,
    ) {
        let name = name.into();
        let replaced = self
            .rules
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(entity_type)
            .or_default()
            .insert(name.clone(), rule)
            .is_some();
        debug!(entity_type = %entity_type, rule = %name, replaced, "registered custom rule");
        self.clear_cache();
    }

    /// Remove the rule named `name`. Returns whether it existed.
    pub fn remove_rule(&self, entity_type: EntityType, name: &str) -> bool {
        let removed = self
            .rules
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(&entity_type)
            .and_then(|rules| rules.remove(name))
            .is_some();
        if removed {
            debug!(entity_type = %entity_type, rule = name, "removed custom rule");
            self.clear_cache();
        }
        removed
    }

    /// Names of the rules registered for `entity_type`, sorted.
    pub fn rule_names(&self, entity_type: EntityType) -> Vec<String> {
        self.rules
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&entity_type)
            .map(|rules| rules.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn clear_cache(&self) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.entries.clear();
        cache.hits = 0;
        cache.misses = 0;
    }

    pub fn cache_stats(&self) -> CacheStats {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        CacheStats {
            entries: cache.entries.len(),
            hits: cache.hits,
            misses: cache.misses,
        }
    }

    /// Findings for one entity before truncation and severity filtering.
    fn raw_findings(
        &self,
        entity: &Value,
        entity_type: EntityType,
        options: &ValidationOptions,
    ) -> Vec<Finding> {
        if entity.is_null() {
            return vec![Finding::error(
                ErrorCode::RequiredFieldMissing,
                "",
                format!("No {entity_type} provided"),
            )];
        }

        if options.auto_fix {
            let report = self.auto_fix(entity, entity_type);
            return self.collect(&report.entity, entity_type, options);
        }

        let key = cache_key(entity, entity_type).filter(|_| options.enable_cache);
        let digest = key.as_ref().map(|_| content_digest(entity));
        if let (Some(key), Some(digest)) = (&key, &digest) {
            let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            let cached = cache
                .entries
                .get(key)
                .filter(|entry| &entry.digest == digest)
                .map(|entry| entry.findings.clone());
            if let Some(findings) = cached {
                cache.hits += 1;
                debug!(key = %key, "validation cache hit");
                return findings;
            }
            cache.misses += 1;
        }

        let findings = self.collect(entity, entity_type, options);
        if let (Some(key), Some(digest)) = (key, digest) {
            self.cache
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .entries
                .insert(
                    key,
                    CacheEntry {
                        digest,
                        findings: findings.clone(),
                    },
                );
        }
        findings
    }

    fn collect(
        &self,
        entity: &Value,
        entity_type: EntityType,
        options: &ValidationOptions,
    ) -> Vec<Finding> {
        let mut out = Findings::new();
        let Some(fields) = entity.as_object() else {
            out.error(
                ErrorCode::InvalidType,
                "",
                format!("A {entity_type} must be an object, got {}", type_name(entity)),
            );
            return out.into_vec();
        };

        schema::check_required(fields, entity_type, &mut out);
        schema::check_types(fields, entity_type, &mut out);

        match entity_type {
            EntityType::Part => part::validate(entity, &mut out),
            EntityType::Resource => resource::validate(entity, &mut out),
            EntityType::CelestialBody => celestial::validate(entity, &mut out),
            EntityType::Technology => technology::validate(entity, &mut out),
        }

        // Clone the rule handles so no lock is held while user code runs.
        let rules: Vec<(String, Arc<dyn ValidationRule>)> = self
            .rules
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&entity_type)
            .map(|rules| {
                rules
                    .iter()
                    .map(|(name, rule)| (name.clone(), Arc::clone(rule)))
                    .collect()
            })
            .unwrap_or_default();

        let context = RuleContext {
            entity_type,
            options,
        };
        for (name, rule) in rules {
            if let Some(finding) = run_rule(&name, rule.as_ref(), entity, &context) {
                out.push(finding);
            }
        }

        out.into_vec()
    }
}

fn cache_key(entity: &Value, entity_type: EntityType) -> Option<String> {
    entity
        .get("id")
        .and_then(Value::as_str)
        .map(|id| format!("{entity_type}:{id}"))
}

fn content_digest(entity: &Value) -> Vec<u8> {
    Sha256::digest(entity.to_string().as_bytes()).to_vec()
}
