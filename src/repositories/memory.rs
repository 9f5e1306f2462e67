//! Process-local repositories used when no `DATABASE_URL` is configured and
//! by the test suites. Records keep insertion order; "newest first" listings
//! walk that order backwards.

use crate::error::ApiError;
use crate::models::{Entry, NewEntry, NewPatient, NewUser, Patient, User, UserChanges};
use crate::repositories::{EntryRepository, PatientRepository, UserRepository};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, ApiError> {
        Ok(self.users.read().await.clone())
    }

    async fn create(&self, user: NewUser) -> Result<User, ApiError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == user.username) {
            return Err(ApiError::conflict("User already exists"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, ApiError> {
        let mut users = self.users.write().await;

        if let Some(ref username) = changes.username {
            if users.iter().any(|u| u.id != id && &u.username == username) {
                return Err(ApiError::conflict("User already exists"));
            }
        }

        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };

        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() != before)
    }
}

/// Shares the entry store so that deleting a patient can take its entries
/// with it under one pair of locks.
pub struct InMemoryPatientRepository {
    patients: RwLock<Vec<Patient>>,
    entries: Arc<InMemoryEntryRepository>,
}

impl InMemoryPatientRepository {
    pub fn new(entries: Arc<InMemoryEntryRepository>) -> Self {
        Self {
            patients: RwLock::new(Vec::new()),
            entries,
        }
    }
}

#[async_trait]
impl PatientRepository for InMemoryPatientRepository {
    async fn list_for_nurse(&self, nurse_id: Uuid) -> Result<Vec<Patient>, ApiError> {
        let patients = self.patients.read().await;
        Ok(patients
            .iter()
            .rev()
            .filter(|p| p.nurse_id == nurse_id)
            .cloned()
            .collect())
    }

    async fn find_for_nurse(&self, id: Uuid, nurse_id: Uuid) -> Result<Option<Patient>, ApiError> {
        let patients = self.patients.read().await;
        Ok(patients
            .iter()
            .find(|p| p.id == id && p.nurse_id == nurse_id)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Patient>, ApiError> {
        let patients = self.patients.read().await;
        Ok(patients.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, nurse_id: Uuid, patient: NewPatient) -> Result<Patient, ApiError> {
        let now = Utc::now();
        let patient = Patient {
            id: Uuid::new_v4(),
            first_name: patient.first_name,
            last_name: patient.last_name,
            room_number: patient.room_number,
            diagnosis: patient.diagnosis,
            nurse_id,
            created_at: now,
            updated_at: now,
        };
        self.patients.write().await.push(patient.clone());
        Ok(patient)
    }

    async fn has_patients(&self, nurse_id: Uuid) -> Result<bool, ApiError> {
        let patients = self.patients.read().await;
        Ok(patients.iter().any(|p| p.nurse_id == nurse_id))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        // Lock order: patients, then entries
        let mut patients = self.patients.write().await;
        let mut entries = self.entries.entries.write().await;

        let before = patients.len();
        patients.retain(|p| p.id != id);
        if patients.len() == before {
            return Ok(false);
        }

        entries.retain(|e| e.patient_id != id);
        Ok(true)
    }
}

#[derive(Default)]
pub struct InMemoryEntryRepository {
    entries: RwLock<Vec<Entry>>,
}

impl InMemoryEntryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntryRepository for InMemoryEntryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Entry>, ApiError> {
        let entries = self.entries.read().await;
        Ok(entries.iter().find(|e| e.id == id).cloned())
    }

    async fn list_for_patient(&self, patient_id: Uuid) -> Result<Vec<Entry>, ApiError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .rev()
            .filter(|e| e.patient_id == patient_id)
            .cloned()
            .collect())
    }

    async fn create(&self, entry: NewEntry) -> Result<Entry, ApiError> {
        let now = Utc::now();
        let entry = Entry {
            id: Uuid::new_v4(),
            patient_id: entry.patient_id,
            vital_signs: entry.vital_signs,
            subjective: entry.subjective,
            objective: entry.objective,
            assessment: entry.assessment,
            plan: entry.plan,
            transcript: entry.transcript,
            reviewed: false,
            created_at: now,
            updated_at: now,
        };
        self.entries.write().await.push(entry.clone());
        Ok(entry)
    }

    async fn update(&self, entry: &Entry) -> Result<Option<Entry>, ApiError> {
        let mut entries = self.entries.write().await;
        let Some(stored) = entries.iter_mut().find(|e| e.id == entry.id) else {
            return Ok(None);
        };

        *stored = Entry {
            patient_id: stored.patient_id,
            created_at: stored.created_at,
            updated_at: Utc::now(),
            ..entry.clone()
        };

        Ok(Some(stored.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::rbac::Role;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "$argon2id$x".to_string(),
            role: Role::Nurse,
        }
    }

    #[tokio::test]
    async fn test_user_username_is_unique() {
        let repo = InMemoryUserRepository::new();
        let first = repo.create(new_user("b")).await.unwrap();
        let second = repo.create(new_user("c")).await.unwrap();

        assert!(matches!(repo.create(new_user("b")).await, Err(ApiError::Conflict(_))));

        let rename = UserChanges {
            username: Some("b".into()),
            ..Default::default()
        };
        assert!(matches!(repo.update(second.id, rename).await, Err(ApiError::Conflict(_))));

        let promote = UserChanges {
            role: Some(Role::Admin),
            ..Default::default()
        };
        let updated = repo.update(first.id, promote).await.unwrap().unwrap();
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.username, "b");
    }

    #[tokio::test]
    async fn test_user_update_and_delete_missing() {
        let repo = InMemoryUserRepository::new();
        assert!(repo.update(Uuid::new_v4(), UserChanges::default()).await.unwrap().is_none());
        assert!(!repo.delete(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_patients_scoped_to_nurse_newest_first() {
        let repo = InMemoryPatientRepository::new(Arc::new(InMemoryEntryRepository::new()));
        let nurse = Uuid::new_v4();
        let other = Uuid::new_v4();

        for (name, owner) in [("First", nurse), ("Other", other), ("Second", nurse)] {
            repo.create(
                owner,
                NewPatient {
                    first_name: name.into(),
                    last_name: "Doe".into(),
                    room_number: "1".into(),
                    diagnosis: "Flu".into(),
                },
            )
            .await
            .unwrap();
        }

        let names: Vec<_> = repo
            .list_for_nurse(nurse)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.first_name)
            .collect();
        assert_eq!(names, vec!["Second", "First"]);

        let others = repo.list_for_nurse(other).await.unwrap();
        assert!(repo.find_for_nurse(others[0].id, nurse).await.unwrap().is_none());
        assert!(repo.find_by_id(others[0].id).await.unwrap().is_some());

        assert!(repo.has_patients(nurse).await.unwrap());
        assert!(!repo.has_patients(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_entries_update_keeps_owner() {
        let repo = InMemoryEntryRepository::new();
        let patient = Uuid::new_v4();

        let entry = repo
            .create(NewEntry {
                patient_id: patient,
                plan: "Rest".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        repo.create(NewEntry {
            patient_id: Uuid::new_v4(),
            ..Default::default()
        })
        .await
        .unwrap();

        let mut changed = entry.clone();
        changed.reviewed = true;
        changed.patient_id = Uuid::new_v4();
        let stored = repo.update(&changed).await.unwrap().unwrap();
        assert!(stored.reviewed);
        assert_eq!(stored.patient_id, patient);
    }

    #[tokio::test]
    async fn test_patient_delete_takes_its_entries() {
        let entries = Arc::new(InMemoryEntryRepository::new());
        let patients = InMemoryPatientRepository::new(entries.clone());
        let nurse = Uuid::new_v4();

        let mut ids = Vec::new();
        for name in ["Jane", "John"] {
            let patient = patients
                .create(
                    nurse,
                    NewPatient {
                        first_name: name.into(),
                        last_name: "Doe".into(),
                        room_number: "3".into(),
                        diagnosis: "Flu".into(),
                    },
                )
                .await
                .unwrap();
            entries
                .create(NewEntry {
                    patient_id: patient.id,
                    ..Default::default()
                })
                .await
                .unwrap();
            ids.push(patient.id);
        }

        assert!(patients.delete(ids[0]).await.unwrap());
        assert!(entries.list_for_patient(ids[0]).await.unwrap().is_empty());
        assert_eq!(entries.list_for_patient(ids[1]).await.unwrap().len(), 1);

        assert!(!patients.delete(ids[0]).await.unwrap());
    }
}
