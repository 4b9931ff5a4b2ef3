//! Recording in-memory ports shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use users::contract::context::RequestCtx;
use users::contract::model::{NewUser, User, UserFilter, UserPatch};
use users::domain::events::UserDomainEvent;
use users::domain::password::PasswordHash;
use users::domain::ports::EventPublisher;
use users::domain::repo::{PageWindow, UsersRepository};
use users::domain::service::{Service, ServiceConfig};
use uuid::Uuid;

/// Ordered log of collaborator calls, shared by repository and publisher.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

#[derive(Default)]
pub struct MockRepo {
    pub users: Mutex<HashMap<Uuid, (User, String)>>,
    pub journal: Journal,
    pub fail: AtomicBool,
    pub delay: Mutex<Option<Duration>>,
}

impl MockRepo {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            ..Default::default()
        }
    }

    pub fn seed(&self, user: User, password: &str) {
        self.users
            .lock()
            .unwrap()
            .insert(user.id, (user, password.to_string()));
    }

    pub fn stored_password(&self, id: Uuid) -> Option<String> {
        self.users.lock().unwrap().get(&id).map(|(_, p)| p.clone())
    }

    pub fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    async fn enter(&self, op: impl Into<String>) -> anyhow::Result<()> {
        self.journal.lock().unwrap().push(op.into());
        let delay = *self.delay.lock().unwrap();
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        if self.fail.swap(false, Ordering::SeqCst) {
            anyhow::bail!("connection reset by peer");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl UsersRepository for MockRepo {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        self.enter("repo.find_by_id").await?;
        Ok(self.users.lock().unwrap().get(&id).map(|(u, _)| u.clone()))
    }

    async fn list(&self, window: PageWindow, _filter: &UserFilter) -> anyhow::Result<Vec<User>> {
        self.enter(format!(
            "repo.list offset={} limit={}",
            window.offset, window.limit
        ))
        .await?;
        let mut all: Vec<User> = self
            .users
            .lock()
            .unwrap()
            .values()
            .map(|(u, _)| u.clone())
            .collect();
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.email.cmp(&b.email))
        });
        Ok(all
            .into_iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .collect())
    }

    async fn create(&self, user: &NewUser, password: &PasswordHash) -> anyhow::Result<User> {
        self.enter("repo.create").await?;
        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            nickname: user.nickname.clone(),
            email: user.email.clone(),
            country: user.country.clone(),
            created_at: now,
            updated_at: Some(now),
        };
        self.seed(created.clone(), password.as_str());
        Ok(created)
    }

    async fn update(&self, id: Uuid, patch: &UserPatch) -> anyhow::Result<Option<User>> {
        self.enter("repo.update").await?;
        let mut users = self.users.lock().unwrap();
        let Some((user, _)) = users.get_mut(&id) else {
            return Ok(None);
        };
        for (dst, src) in [
            (&mut user.first_name, &patch.first_name),
            (&mut user.last_name, &patch.last_name),
            (&mut user.nickname, &patch.nickname),
            (&mut user.email, &patch.email),
            (&mut user.country, &patch.country),
        ] {
            if !src.is_empty() {
                *dst = src.clone();
            }
        }
        user.updated_at = Some(Utc::now());
        Ok(Some(user.clone()))
    }

    async fn update_password(&self, id: Uuid, password: &PasswordHash) -> anyhow::Result<bool> {
        self.enter("repo.update_password").await?;
        let mut users = self.users.lock().unwrap();
        match users.get_mut(&id) {
            Some((_, stored)) => {
                *stored = password.as_str().to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        self.enter("repo.delete").await?;
        Ok(self.users.lock().unwrap().remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct MockPublisher {
    pub journal: Journal,
    pub published: Mutex<Vec<UserDomainEvent>>,
    pub correlation_ids: Mutex<Vec<Option<String>>>,
    pub fail: AtomicBool,
    pub delay: Mutex<Option<Duration>>,
}

impl MockPublisher {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            ..Default::default()
        }
    }

    pub fn published(&self) -> Vec<UserDomainEvent> {
        self.published.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<String> {
        self.published()
            .iter()
            .map(|e| e.kind().to_string())
            .collect()
    }

    pub fn fail_always(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }
}

#[async_trait::async_trait]
impl EventPublisher<UserDomainEvent> for MockPublisher {
    async fn publish(&self, ctx: &RequestCtx, event: &UserDomainEvent) -> anyhow::Result<()> {
        self.journal
            .lock()
            .unwrap()
            .push(format!("events.publish {}", event.kind()));
        let delay = *self.delay.lock().unwrap();
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("broker unavailable");
        }
        self.correlation_ids
            .lock()
            .unwrap()
            .push(ctx.correlation_id().map(str::to_owned));
        self.published.lock().unwrap().push(event.clone());
        Ok(())
    }
}

pub struct Harness {
    pub journal: Journal,
    pub repo: Arc<MockRepo>,
    pub events: Arc<MockPublisher>,
    pub service: Service,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ServiceConfig::default())
    }

    pub fn with_config(config: ServiceConfig) -> Self {
        let journal = Journal::default();
        let repo = Arc::new(MockRepo::new(journal.clone()));
        let events = Arc::new(MockPublisher::new(journal.clone()));
        let service = Service::new(repo.clone(), events.clone(), config);
        Self {
            journal,
            repo,
            events,
            service,
        }
    }

    pub fn calls(&self) -> Vec<String> {
        entries(&self.journal)
    }

    pub fn clear_calls(&self) {
        self.journal.lock().unwrap().clear();
    }

    /// Insert a user directly into the mock store, bypassing the service.
    pub fn seed_user(&self, email: &str, country: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            nickname: "johndoe".to_string(),
            email: email.to_string(),
            country: country.to_string(),
            created_at: now,
            updated_at: Some(now),
        };
        self.repo.seed(user.clone(), "");
        user
    }
}

pub fn new_user() -> NewUser {
    NewUser {
        id: None,
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        nickname: "johndoe".to_string(),
        email: "johndoe@email.com".to_string(),
        country: "us".to_string(),
    }
}

pub const TESTPWD_HASH: &str = "a85b6a20813c31a8b1b3f3618da796271c9aa293b3f809873053b21aec501087";
