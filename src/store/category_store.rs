use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, IntoActiveModel, QueryFilter, QuerySelect, TransactionTrait,
};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::entity::{CategoryEntity, category};
use crate::errors::ApiError;
use crate::filtering::{Pagination, SearchFilter};
use crate::hal::Page;
use crate::migration::MASTER_CATEGORY_CODE;
use crate::models::{Category, CategoryUpdate};
use crate::validation::{
    ValidationError, ValidationErrors,
    validators::{validate_code, validate_required},
};

use super::query::list_categories;

/// What happens to the children of a removed category
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RemovalPolicy {
    /// Remove the whole subtree
    #[default]
    Cascade,
    /// Refuse while children exist
    Restrict,
}

impl FromStr for RemovalPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cascade" => Ok(Self::Cascade),
            "restrict" => Ok(Self::Restrict),
            other => Err(format!(
                "expected \"cascade\" or \"restrict\", got \"{other}\""
            )),
        }
    }
}

impl fmt::Display for RemovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cascade => f.write_str("cascade"),
            Self::Restrict => f.write_str("restrict"),
        }
    }
}

/// Options of [`CategoryStore::save`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaveOptions {
    /// Commit immediately (with everything staged before) instead of staging
    pub flush: bool,
}

impl SaveOptions {
    /// Stage the write until the next flush
    pub const DEFERRED: Self = Self { flush: false };
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self { flush: true }
    }
}

/// Persistent category store with deferred-flush support.
///
/// Clones share the same connection pool and staging buffer. Staged writes
/// are visible to the parent checks of [`CategoryStore::update`] and
/// [`CategoryStore::save`] but not to reads, which only see committed rows.
/// The master category is never removed.
#[derive(Clone)]
pub struct CategoryStore {
    db: DatabaseConnection,
    removal_policy: RemovalPolicy,
    staged: Arc<Mutex<Vec<Category>>>,
}

impl CategoryStore {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            removal_policy: RemovalPolicy::default(),
            staged: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn with_removal_policy(mut self, removal_policy: RemovalPolicy) -> Self {
        self.removal_policy = removal_policy;
        self
    }

    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// A new, empty and unsaved category
    #[must_use]
    pub fn create() -> Category {
        Category::default()
    }

    /// Apply `update` to `category` in place.
    ///
    /// Everything is validated first; on failure the category is untouched.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` listing every invalid field: malformed or changed
    /// code, missing parent, self-parenting, or a parent that is one of the
    /// category's own descendants. Database errors are propagated.
    pub async fn update(
        &self,
        category: &mut Category,
        update: CategoryUpdate,
    ) -> Result<(), ApiError> {
        let CategoryUpdate {
            code,
            parent,
            labels,
        } = update;
        let mut errors = ValidationErrors::new();

        let code = match code {
            Some(code) => {
                errors.check(validate_code("code", &code));
                if !category.code.is_empty() && category.code != code {
                    errors.add(ValidationError::new(
                        "code",
                        "This property cannot be changed.",
                    ));
                }
                code
            }
            None => {
                errors.check(validate_required("code", &category.code));
                category.code.clone()
            }
        };

        if let Some(Some(parent_code)) = &parent {
            let staged = self.staged.lock().await;
            if let Some(error) = self.parent_error(&staged, &code, parent_code).await? {
                errors.add(error);
            }
        }

        if let Some(labels) = &labels
            && labels.keys().any(|locale| locale.trim().is_empty())
        {
            errors.add(ValidationError::new(
                "labels",
                "Locale codes should not be blank.",
            ));
        }

        errors.result()?;

        category.code = code;
        if let Some(parent) = parent {
            category.parent = parent;
        }
        for (locale, label) in labels.unwrap_or_default() {
            match label {
                Some(label) if !label.is_empty() => {
                    category.labels.insert(locale, label);
                }
                _ => {
                    category.labels.remove(&locale);
                }
            }
        }
        Ok(())
    }

    /// Check that `parent` may become the parent of `code`, against the
    /// staged writes and then the committed rows
    async fn parent_error(
        &self,
        staged: &[Category],
        code: &str,
        parent: &str,
    ) -> Result<Option<ValidationError>, ApiError> {
        if parent == code {
            return Ok(Some(ValidationError::new(
                "parent",
                "A category cannot be its own parent.",
            )));
        }

        let Some(mut ancestor) = self.lookup(staged, parent).await? else {
            return Ok(Some(ValidationError::new(
                "parent",
                format!("The category \"{parent}\" does not exist."),
            )));
        };

        let mut visited = HashSet::from([parent.to_string()]);
        while let Some(next) = ancestor.parent.take() {
            if next == code {
                return Ok(Some(ValidationError::new(
                    "parent",
                    format!("The category \"{parent}\" is a descendant of \"{code}\"."),
                )));
            }
            if !visited.insert(next.clone()) {
                tracing::warn!(code = %next, "Category tree already contains a cycle");
                break;
            }
            match self.lookup(staged, &next).await? {
                Some(found) => ancestor = found,
                None => break,
            }
        }

        Ok(None)
    }

    /// Resolve a code against staged writes first, then committed rows
    async fn lookup(&self, staged: &[Category], code: &str) -> Result<Option<Category>, ApiError> {
        match staged.iter().find(|category| category.code == code) {
            Some(category) => Ok(Some(category.clone())),
            None => self.find_one_by_identifier(code).await,
        }
    }

    /// Persist `category`, keyed by its code.
    ///
    /// With [`SaveOptions::DEFERRED`] the write is staged; saving the same
    /// code again replaces the staged copy in place. The code and parent are
    /// checked again against everything staged so far, so categories that
    /// were updated separately cannot close a cycle or point at a missing
    /// parent once saved together.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` for a malformed code, a missing parent or a cycle;
    /// flush errors otherwise.
    pub async fn save(&self, category: &Category, options: SaveOptions) -> Result<(), ApiError> {
        {
            let mut staged = self.staged.lock().await;

            let mut errors = ValidationErrors::new();
            errors.check(validate_code("code", &category.code));
            if errors.is_empty()
                && let Some(parent) = &category.parent
                && let Some(error) = self.parent_error(&staged, &category.code, parent).await?
            {
                errors.add(error);
            }
            errors.result()?;

            match staged.iter_mut().find(|staged| staged.code == category.code) {
                Some(existing) => existing.clone_from(category),
                None => staged.push(category.clone()),
            }
        }
        tracing::debug!(code = %category.code, flush = options.flush, "Saved category");

        if options.flush {
            self.flush().await?;
        }
        Ok(())
    }

    /// Commit every staged write in one transaction, in staging order.
    ///
    /// Returns how many categories were written. When the transaction
    /// fails the staged writes are kept.
    ///
    /// # Errors
    ///
    /// Propagates database errors.
    pub async fn flush(&self) -> Result<usize, ApiError> {
        let mut staged = self.staged.lock().await;
        if staged.is_empty() {
            return Ok(0);
        }

        let txn = self.db.begin().await?;
        for category in staged.iter() {
            upsert(&txn, category).await?;
        }
        txn.commit().await?;

        let count = staged.len();
        staged.clear();
        tracing::info!(count, "Flushed categories");
        Ok(count)
    }

    /// Committed category with this code, if any
    ///
    /// # Errors
    ///
    /// Propagates database errors.
    pub async fn find_one_by_identifier(&self, code: &str) -> Result<Option<Category>, ApiError> {
        let model = CategoryEntity::find()
            .filter(category::Column::Code.eq(code))
            .one(&self.db)
            .await?;
        Ok(model.map(Category::from))
    }

    /// Remove a committed category according to the removal policy.
    ///
    /// Returns the removed codes, the category itself first. Staged writes
    /// for removed codes, or for categories below them, are dropped.
    ///
    /// # Errors
    ///
    /// `NotFound` when the category is not committed, `Conflict` when it
    /// has children under [`RemovalPolicy::Restrict`] or when the master
    /// category would be removed.
    pub async fn remove(&self, category: &Category) -> Result<Vec<String>, ApiError> {
        if category.code == MASTER_CATEGORY_CODE {
            return Err(master_removal(MASTER_CATEGORY_CODE));
        }

        let txn = self.db.begin().await?;

        let exists = CategoryEntity::find()
            .filter(category::Column::Code.eq(category.code.as_str()))
            .one(&txn)
            .await?
            .is_some();
        if !exists {
            return Err(ApiError::category_not_found(&category.code));
        }

        let mut removed = vec![category.code.clone()];
        let mut seen: HashSet<String> = removed.iter().cloned().collect();
        let mut frontier = removed.clone();
        loop {
            let children = child_codes(&txn, &frontier).await?;
            if children.is_empty() {
                break;
            }
            if self.removal_policy == RemovalPolicy::Restrict {
                return Err(ApiError::conflict(format!(
                    "Category \"{}\" cannot be removed because it has children.",
                    category.code
                )));
            }
            frontier = children
                .into_iter()
                .filter(|code| seen.insert(code.clone()))
                .collect();
            if frontier.is_empty() {
                break;
            }
            removed.extend(frontier.iter().cloned());
        }

        // master can only sit below another category after being reparented
        if seen.contains(MASTER_CATEGORY_CODE) {
            return Err(master_removal(&category.code));
        }

        CategoryEntity::delete_many()
            .filter(category::Column::Code.is_in(removed.clone()))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        {
            let mut staged = self.staged.lock().await;
            let mut gone = seen;
            while let Some(position) = staged.iter().position(|staged| {
                gone.contains(&staged.code)
                    || staged.parent.as_ref().is_some_and(|parent| gone.contains(parent))
            }) {
                let dropped = staged.remove(position);
                gone.insert(dropped.code);
            }
        }

        tracing::info!(code = %category.code, removed = removed.len(), "Removed category");
        Ok(removed)
    }

    /// Run a search against committed categories
    ///
    /// # Errors
    ///
    /// Propagates database errors.
    pub async fn search(
        &self,
        filter: &SearchFilter,
        pagination: &Pagination,
    ) -> Result<Page<Category>, ApiError> {
        Ok(list_categories(&self.db, filter, pagination).await?)
    }
}

fn master_removal(code: &str) -> ApiError {
    if code == MASTER_CATEGORY_CODE {
        ApiError::conflict(format!(
            "Category \"{MASTER_CATEGORY_CODE}\" cannot be removed."
        ))
    } else {
        ApiError::conflict(format!(
            "Category \"{code}\" cannot be removed because category \"{MASTER_CATEGORY_CODE}\" is below it."
        ))
    }
}

async fn child_codes<C: ConnectionTrait>(db: &C, parents: &[String]) -> Result<Vec<String>, DbErr> {
    CategoryEntity::find()
        .select_only()
        .column(category::Column::Code)
        .filter(category::Column::Parent.is_in(parents.to_vec()))
        .into_tuple()
        .all(db)
        .await
}

async fn upsert<C: ConnectionTrait>(db: &C, category: &Category) -> Result<(), DbErr> {
    let labels =
        serde_json::to_value(&category.labels).map_err(|err| DbErr::Json(err.to_string()))?;

    let existing = CategoryEntity::find()
        .filter(category::Column::Code.eq(category.code.as_str()))
        .one(db)
        .await?;

    match existing {
        Some(model) => {
            let mut active = model.into_active_model();
            active.parent = Set(category.parent.clone());
            active.labels = Set(labels);
            active.update(db).await?;
        }
        None => {
            category::ActiveModel {
                code: Set(category.code.clone()),
                parent: Set(category.parent.clone()),
                labels: Set(labels),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removal_policy_from_str() {
        assert_eq!("cascade".parse(), Ok(RemovalPolicy::Cascade));
        assert_eq!(" RESTRICT ".parse(), Ok(RemovalPolicy::Restrict));
        assert!("orphan".parse::<RemovalPolicy>().is_err());
        assert_eq!(RemovalPolicy::Restrict.to_string(), "restrict");
    }

    #[test]
    fn test_save_options_default_flushes() {
        assert!(SaveOptions::default().flush);
        assert!(!SaveOptions::DEFERRED.flush);
    }
}
