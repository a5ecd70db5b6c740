//! Account repository for chart of accounts database operations.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use folio_core::ledger::account::{
    RETAINED_EARNINGS_CODE, RETAINED_EARNINGS_NAME, RETAINED_EARNINGS_SUBTYPE, validate_new_account,
    validate_parent,
};
use folio_core::ledger::{
    Account, AccountFilter, AccountPatch, AccountType, CreateAccountInput, DimensionFlags,
    LedgerError,
};
use folio_shared::types::{AccountId, ActorId, CompanyId};

use crate::entities::accounts;
use crate::mapping::stored;
use crate::unit_of_work::{self, db_err, for_update, unique_or};

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Code or name is blank
    /// - Account code already exists in the company
    /// - Parent does not exist in the company or has a different type
    pub async fn create_account(
        &self,
        company_id: CompanyId,
        actor_id: ActorId,
        input: CreateAccountInput,
    ) -> Result<Account, LedgerError> {
        let (code, name) = validate_new_account(&input)?;

        let txn = unit_of_work::begin(&self.db).await?;

        if let Some(parent_id) = input.parent_id {
            let parent = find_account(&txn, company_id, parent_id).await?;
            validate_parent(input.account_type, parent_id, parent.as_ref())?;
        }

        if find_by_code(&txn, company_id, &code).await?.is_some() {
            return Err(LedgerError::DuplicateAccountCode(code));
        }

        let account = insert_account(
            &txn,
            company_id,
            Some(actor_id),
            NewAccount {
                code,
                name,
                input,
                is_system: false,
            },
        )
        .await?;

        unit_of_work::commit(txn).await?;
        Ok(account)
    }

    /// Applies `patch` to an account, returning its before and after states.
    ///
    /// Code and type are immutable.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is not found, the new name is blank,
    /// or a system account would be deactivated.
    pub async fn update_account(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
        patch: &AccountPatch,
    ) -> Result<(Account, Account), LedgerError> {
        let txn = unit_of_work::begin(&self.db).await?;

        let model = for_update(
            accounts::Entity::find_by_id(account_id.into_inner())
                .filter(accounts::Column::CompanyId.eq(company_id.into_inner())),
            txn.get_database_backend(),
        )
        .one(&txn)
        .await
        .map_err(db_err)?
        .ok_or(LedgerError::AccountNotFound(account_id))?;

        let before = model.clone().into_domain()?;
        let after = before.apply_patch(patch, Utc::now())?;

        let mut active: accounts::ActiveModel = model.into();
        active.name = Set(after.name.clone());
        active.subtype = Set(after.subtype.clone());
        active.description = Set(after.description.clone());
        active.tax_code = Set(after.tax_code.clone());
        active.is_active = Set(after.is_active);
        active.track_location = Set(after.dimensions.track_location);
        active.track_department = Set(after.dimensions.track_department);
        active.track_project = Set(after.dimensions.track_project);
        active.track_class = Set(after.dimensions.track_class);
        active.updated_at = Set(stored(after.updated_at));

        let after = active.update(&txn).await.map_err(db_err)?.into_domain()?;

        unit_of_work::commit(txn).await?;
        Ok((before, after))
    }

    /// Gets an account by ID within a company.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if it does not exist in the company.
    pub async fn get_account(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
    ) -> Result<Account, LedgerError> {
        find_account(&self.db, company_id, account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    /// Lists a company's accounts ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(
        &self,
        company_id: CompanyId,
        filter: AccountFilter,
    ) -> Result<Vec<Account>, LedgerError> {
        let mut query = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_id.into_inner()));

        if let Some(account_type) = filter.account_type {
            query = query.filter(accounts::Column::AccountType.eq(account_type.as_str()));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(accounts::Column::IsActive.eq(is_active));
        }

        query
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(accounts::Model::into_domain)
            .collect()
    }
}

/// Fields of an account about to be inserted, already validated.
pub(crate) struct NewAccount {
    pub(crate) code: String,
    pub(crate) name: String,
    pub(crate) input: CreateAccountInput,
    pub(crate) is_system: bool,
}

pub(crate) async fn insert_account<C: ConnectionTrait>(
    conn: &C,
    company_id: CompanyId,
    created_by: Option<ActorId>,
    new: NewAccount,
) -> Result<Account, LedgerError> {
    let now = stored(Utc::now());
    let NewAccount {
        code,
        name,
        input,
        is_system,
    } = new;

    let active = accounts::ActiveModel {
        id: Set(AccountId::new().into_inner()),
        company_id: Set(company_id.into_inner()),
        code: Set(code.clone()),
        name: Set(name),
        account_type: Set(input.account_type.as_str().to_string()),
        subtype: Set(input.subtype),
        parent_id: Set(input.parent_id.map(AccountId::into_inner)),
        description: Set(input.description),
        tax_code: Set(input.tax_code),
        is_bank_account: Set(input.is_bank_account),
        track_location: Set(input.dimensions.track_location),
        track_department: Set(input.dimensions.track_department),
        track_project: Set(input.dimensions.track_project),
        track_class: Set(input.dimensions.track_class),
        is_active: Set(true),
        is_system: Set(is_system),
        created_by: Set(created_by.map(ActorId::into_inner)),
        created_at: Set(now),
        updated_at: Set(now),
    };

    active
        .insert(conn)
        .await
        .map_err(|e| unique_or(e, || LedgerError::DuplicateAccountCode(code)))?
        .into_domain()
}

pub(crate) async fn find_account<C: ConnectionTrait>(
    conn: &C,
    company_id: CompanyId,
    account_id: AccountId,
) -> Result<Option<Account>, LedgerError> {
    accounts::Entity::find_by_id(account_id.into_inner())
        .filter(accounts::Column::CompanyId.eq(company_id.into_inner()))
        .one(conn)
        .await
        .map_err(db_err)?
        .map(accounts::Model::into_domain)
        .transpose()
}

async fn find_by_code<C: ConnectionTrait>(
    conn: &C,
    company_id: CompanyId,
    code: &str,
) -> Result<Option<Account>, LedgerError> {
    accounts::Entity::find()
        .filter(accounts::Column::CompanyId.eq(company_id.into_inner()))
        .filter(accounts::Column::Code.eq(code))
        .one(conn)
        .await
        .map_err(db_err)?
        .map(accounts::Model::into_domain)
        .transpose()
}

/// Loads the company's accounts among `ids`, keyed by id.
///
/// Ids that belong to another company are simply absent.
pub(crate) async fn find_accounts<C: ConnectionTrait>(
    conn: &C,
    company_id: CompanyId,
    ids: &[AccountId],
) -> Result<HashMap<AccountId, Account>, LedgerError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    accounts::Entity::find()
        .filter(accounts::Column::CompanyId.eq(company_id.into_inner()))
        .filter(accounts::Column::Id.is_in(ids.iter().map(|id| id.into_inner())))
        .all(conn)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(|model| model.into_domain().map(|account| (account.id, account)))
        .collect()
}

/// Resolves the account that receives closing entries.
///
/// A requested account must be an equity account in the company. Without a
/// request, an existing equity account coded `3999` is reused as it is, even
/// when a user created it; otherwise one is created as a system account.
/// Activity is not checked here; the closing entry's validation rejects an
/// inactive account. Returns the account and whether it was just created.
pub(crate) async fn resolve_retained_earnings<C: ConnectionTrait>(
    conn: &C,
    company_id: CompanyId,
    actor_id: ActorId,
    requested: Option<AccountId>,
) -> Result<(Account, bool), LedgerError> {
    if let Some(account_id) = requested {
        let account = find_account(conn, company_id, account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;
        if account.account_type != AccountType::Equity {
            return Err(LedgerError::RetainedEarningsNotEquity(account_id));
        }
        return Ok((account, false));
    }

    if let Some(account) = find_by_code(conn, company_id, RETAINED_EARNINGS_CODE).await? {
        if account.account_type != AccountType::Equity {
            return Err(LedgerError::RetainedEarningsNotEquity(account.id));
        }
        return Ok((account, false));
    }

    let account = insert_account(
        conn,
        company_id,
        Some(actor_id),
        NewAccount {
            code: RETAINED_EARNINGS_CODE.to_string(),
            name: RETAINED_EARNINGS_NAME.to_string(),
            input: CreateAccountInput {
                code: RETAINED_EARNINGS_CODE.to_string(),
                name: RETAINED_EARNINGS_NAME.to_string(),
                account_type: AccountType::Equity,
                subtype: Some(RETAINED_EARNINGS_SUBTYPE.to_string()),
                parent_id: None,
                description: Some("Accumulated net income, maintained by period closing".into()),
                tax_code: None,
                is_bank_account: false,
                dimensions: DimensionFlags::default(),
            },
            is_system: true,
        },
    )
    .await?;
    Ok((account, true))
}
