//! Distributor application store
//!
//! The shopper's own application is polled in the background, so every read
//! and write of it is fenced: a poll that was in flight when a withdraw or a
//! new submission went through cannot put the older state back.

use std::sync::Arc;

use tokio::sync::RwLock;
use validator::Validate;

use crate::api::{AdminApi, ClientError, StorefrontApi};
use crate::domain::aggregates::{ApplicationDraft, ApplicationError, Decision, DistributorApplication};
use crate::domain::events::{DistributorEvent, EventBus, StoreEvent};
use crate::store::sequence::{RequestSequencer, Ticket};
use crate::{Result, StorefrontError};

const ALL_APPLICATIONS: &str = "applications";

fn application_key(user_id: &str) -> String { format!("application:{}", user_id) }

pub struct DistributorStore {
    api: Arc<dyn StorefrontApi>,
    admin: Arc<dyn AdminApi>,
    events: EventBus,
    mine: RwLock<Option<DistributorApplication>>,
    all: RwLock<Vec<DistributorApplication>>,
    sequencer: RequestSequencer,
}

impl DistributorStore {
    pub fn new(api: Arc<dyn StorefrontApi>, admin: Arc<dyn AdminApi>, events: EventBus) -> Self {
        Self { api, admin, events, mine: RwLock::new(None), all: RwLock::new(Vec::new()), sequencer: RequestSequencer::new() }
    }

    pub async fn mine(&self) -> Option<DistributorApplication> { self.mine.read().await.clone() }
    pub async fn all(&self) -> Vec<DistributorApplication> { self.all.read().await.clone() }

    pub async fn submit(&self, draft: &ApplicationDraft) -> Result<DistributorApplication> {
        draft.validate().map_err(|e| self.refuse(e))?;
        if self.mine.read().await.as_ref().is_some_and(DistributorApplication::is_pending) {
            return Err(self.refuse(ApplicationError::AlreadyPending));
        }

        let ticket = self.sequencer.issue(application_key(&draft.user_id));
        let submitted = self.api.submit_application(draft).await.map_err(|e| self.failed("submit application", e))?;
        tracing::info!(application_id = %submitted.id, "distributor application submitted");
        self.events.publish(StoreEvent::Distributor(DistributorEvent::Submitted { application_id: submitted.id.clone() }));
        self.adopt(&ticket, Some(submitted.clone())).await;
        Ok(submitted)
    }

    /// Re-reads the user's application; publishes a status change when it moved.
    ///
    /// A stale answer is dropped and the local copy returned instead.
    pub async fn refresh_status(&self, user_id: &str) -> Result<Option<DistributorApplication>> {
        let ticket = self.sequencer.issue(application_key(user_id));
        let fresh = self.api.application_for_user(user_id).await.map_err(|e| self.failed("application status", e))?;
        Ok(self.adopt(&ticket, fresh).await)
    }

    /// Pulls a pending application back.
    pub async fn withdraw(&self) -> Result<DistributorApplication> {
        let current = self.mine().await.ok_or_else(|| self.refuse(StorefrontError::Validation("There is no application to withdraw.".to_string())))?;
        current.ensure_withdrawable().map_err(|e| self.refuse(e))?;

        let ticket = self.sequencer.issue(application_key(&current.user_id));
        let withdrawn = self.api.withdraw_application(&current.id).await.map_err(|e| self.failed("withdraw application", e))?;
        self.adopt(&ticket, Some(withdrawn.clone())).await;
        Ok(withdrawn)
    }

    pub async fn list_all(&self) -> Result<Vec<DistributorApplication>> {
        let ticket = self.sequencer.issue(ALL_APPLICATIONS);
        let fresh = self.admin.list_applications().await.map_err(|e| self.failed("list applications", e))?;
        let mut all = self.all.write().await;
        if self.sequencer.commit(&ticket) {
            *all = fresh;
        }
        Ok(all.clone())
    }

    /// Approves or rejects an application that is still pending.
    pub async fn decide(&self, application_id: &str, decision: Decision) -> Result<DistributorApplication> {
        let known = self.all.read().await.iter().find(|a| a.id == application_id).cloned();
        let known = known.ok_or_else(|| self.refuse(StorefrontError::Validation(format!("Unknown application {}", application_id))))?;
        known.ensure_reviewable().map_err(|e| self.refuse(e))?;

        let ticket = self.sequencer.issue(ALL_APPLICATIONS);
        let updated = self.admin
            .set_application_status(application_id, decision.resulting_status())
            .await
            .map_err(|e| self.failed("review application", e))?;
        self.status_changed(&updated);
        let mut all = self.all.write().await;
        if self.sequencer.commit(&ticket) {
            if let Some(slot) = all.iter_mut().find(|a| a.id == updated.id) {
                *slot = updated.clone();
            }
        }
        Ok(updated)
    }

    pub async fn approve(&self, application_id: &str) -> Result<DistributorApplication> {
        self.decide(application_id, Decision::Approve).await
    }

    pub async fn reject(&self, application_id: &str) -> Result<DistributorApplication> {
        self.decide(application_id, Decision::Reject).await
    }

    /// Replaces the user's application if the ticket is still the newest one.
    async fn adopt(&self, ticket: &Ticket, fresh: Option<DistributorApplication>) -> Option<DistributorApplication> {
        let mut mine = self.mine.write().await;
        if !self.sequencer.commit(ticket) {
            return mine.clone();
        }
        let previous = mine.as_ref().map(|a| a.status);
        if let Some(app) = &fresh {
            if previous.is_some_and(|p| p != app.status) {
                self.status_changed(app);
            }
        }
        *mine = fresh;
        mine.clone()
    }

    fn status_changed(&self, app: &DistributorApplication) {
        tracing::info!(application_id = %app.id, status = %app.status, "distributor application status changed");
        self.events.publish(StoreEvent::Distributor(DistributorEvent::StatusChanged { application_id: app.id.clone(), status: app.status }));
    }

    fn refuse(&self, err: impl Into<StorefrontError>) -> StorefrontError {
        let err = err.into();
        tracing::warn!(error = %err, "distributor action refused");
        self.events.warn(err.user_message());
        err
    }

    fn failed(&self, action: &str, err: ClientError) -> StorefrontError {
        let err = StorefrontError::from(err);
        tracing::error!(action, error = %err, "distributor request failed");
        self.events.error(err.user_message());
        err
    }
}
