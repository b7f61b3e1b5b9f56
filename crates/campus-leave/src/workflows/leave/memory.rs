//! Mutex-backed repositories used by the API binary, the demo and tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{AccountId, AccountRecord, LeaveRequest, LeaveRequestId, Profile, Role};
use super::repository::{AccountRepository, LeaveRepository, RepositoryError};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
}

#[derive(Default)]
struct AccountTable {
    records: HashMap<AccountId, AccountRecord>,
    order: Vec<AccountId>,
}

#[derive(Default, Clone)]
pub struct InMemoryAccountRepository {
    table: Arc<Mutex<AccountTable>>,
}

impl AccountRepository for InMemoryAccountRepository {
    fn insert(&self, record: AccountRecord) -> Result<AccountRecord, RepositoryError> {
        let mut table = lock(&self.table)?;
        if table.records.contains_key(&record.account.id) {
            return Err(RepositoryError::Conflict);
        }
        table.order.push(record.account.id.clone());
        table
            .records
            .insert(record.account.id.clone(), record.clone());
        Ok(record)
    }

    fn update_profile(&self, id: &AccountId, profile: Profile) -> Result<(), RepositoryError> {
        let mut table = lock(&self.table)?;
        let record = table.records.get_mut(id).ok_or(RepositoryError::NotFound)?;
        record.profile = profile;
        Ok(())
    }

    fn fetch(&self, id: &AccountId) -> Result<Option<AccountRecord>, RepositoryError> {
        let table = lock(&self.table)?;
        Ok(table.records.get(id).cloned())
    }

    fn by_role(&self, role: Role) -> Result<Vec<AccountRecord>, RepositoryError> {
        let table = lock(&self.table)?;
        Ok(table
            .order
            .iter()
            .filter_map(|id| table.records.get(id))
            .filter(|record| record.account.role == role)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct LeaveTable {
    records: BTreeMap<LeaveRequestId, LeaveRequest>,
    last_id: u64,
}

#[derive(Default, Clone)]
pub struct InMemoryLeaveRepository {
    table: Arc<Mutex<LeaveTable>>,
}

impl LeaveRepository for InMemoryLeaveRepository {
    fn allocate_id(&self) -> Result<LeaveRequestId, RepositoryError> {
        let mut table = lock(&self.table)?;
        table.last_id += 1;
        Ok(LeaveRequestId(table.last_id))
    }

    fn insert(&self, request: LeaveRequest) -> Result<LeaveRequest, RepositoryError> {
        let mut table = lock(&self.table)?;
        if table.records.contains_key(&request.id) {
            return Err(RepositoryError::Conflict);
        }
        table.records.insert(request.id, request.clone());
        Ok(request)
    }

    fn update_if_version(
        &self,
        request: LeaveRequest,
        expected_version: u64,
    ) -> Result<(), RepositoryError> {
        let mut table = lock(&self.table)?;
        let stored = table
            .records
            .get_mut(&request.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.version != expected_version {
            return Err(RepositoryError::StaleVersion {
                expected: expected_version,
                found: stored.version,
            });
        }
        *stored = request;
        Ok(())
    }

    fn fetch(&self, id: LeaveRequestId) -> Result<Option<LeaveRequest>, RepositoryError> {
        let table = lock(&self.table)?;
        Ok(table.records.get(&id).cloned())
    }

    fn by_approver(&self, approver: &AccountId) -> Result<Vec<LeaveRequest>, RepositoryError> {
        let table = lock(&self.table)?;
        Ok(table
            .records
            .values()
            .filter(|request| &request.approver == approver)
            .cloned()
            .collect())
    }

    fn by_student(&self, student: &AccountId) -> Result<Vec<LeaveRequest>, RepositoryError> {
        let table = lock(&self.table)?;
        Ok(table
            .records
            .values()
            .filter(|request| &request.student == student)
            .cloned()
            .collect())
    }
}
