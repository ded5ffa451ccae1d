use super::paths;
use crate::cache::{optimistic, OptimisticList, Position, QueryKey, Tag};
use crate::error::ClientError;
use crate::transport::RequestDescriptor;
use crate::TdcClient;
use chrono::Utc;
use serde_json::{Map, Value};
use tdc_types::error::validate_form;
use tdc_types::{Notification, NotificationDraft, Team};

impl TdcClient {
    // ===== teams =====

    pub async fn teams(&self) -> Result<Vec<Team>, ClientError> {
        self.query(
            QueryKey::new(paths::ADMIN_TEAMS),
            &[Tag::Teams],
            RequestDescriptor::get(paths::ADMIN_TEAMS),
        )
        .await
    }

    pub async fn team(&self, id: i64) -> Result<Team, ClientError> {
        self.query(
            QueryKey::with_arg(paths::ADMIN_TEAMS, id),
            &[Tag::Teams],
            RequestDescriptor::get(paths::admin_team(id)),
        )
        .await
    }

    pub async fn update_team(
        &self,
        id: i64,
        diff: Map<String, Value>,
    ) -> Result<Team, ClientError> {
        let request = RequestDescriptor::patch(paths::admin_team(id)).json(&diff)?;
        let team = self.send(request).await?;
        self.invalidate(&[Tag::Teams]);
        Ok(team)
    }

    pub async fn delete_team(&self, id: i64) -> Result<(), ClientError> {
        self.send_empty(RequestDescriptor::delete(paths::admin_team(id))).await?;
        self.invalidate(&[Tag::Teams]);
        Ok(())
    }

    /// Apply `edited` to `list` at once and PATCH the changed fields.
    pub async fn edit_team(
        &self,
        list: &OptimisticList<Team>,
        edited: Team,
    ) -> Result<Team, ClientError> {
        let id = edited.id;
        optimistic::update(list, id, edited, |diff| self.update_team(id, diff)).await
    }

    pub async fn remove_team(
        &self,
        list: &OptimisticList<Team>,
        id: i64,
    ) -> Result<(), ClientError> {
        optimistic::delete(list, id, self.delete_team(id)).await
    }

    // ===== notifications =====

    pub async fn notifications(&self) -> Result<Vec<Notification>, ClientError> {
        self.query(
            QueryKey::new(paths::ADMIN_NOTIFICATIONS),
            &[Tag::Notifications],
            RequestDescriptor::get(paths::ADMIN_NOTIFICATIONS),
        )
        .await
    }

    pub async fn create_notification(
        &self,
        draft: &NotificationDraft,
    ) -> Result<Notification, ClientError> {
        validate_form(draft)?;
        let request = RequestDescriptor::post(paths::ADMIN_NOTIFICATIONS).json(draft)?;
        let notification = self.send(request).await?;
        self.invalidate(&[Tag::Notifications]);
        Ok(notification)
    }

    pub async fn update_notification(
        &self,
        id: i64,
        diff: Map<String, Value>,
    ) -> Result<Notification, ClientError> {
        let request = RequestDescriptor::patch(paths::admin_notification(id)).json(&diff)?;
        let notification = self.send(request).await?;
        self.invalidate(&[Tag::Notifications]);
        Ok(notification)
    }

    pub async fn delete_notification(&self, id: i64) -> Result<(), ClientError> {
        self.send_empty(RequestDescriptor::delete(paths::admin_notification(id))).await?;
        self.invalidate(&[Tag::Notifications]);
        Ok(())
    }

    /// Show the draft at the top of `list` immediately, then create it.
    pub async fn publish_notification(
        &self,
        list: &OptimisticList<Notification>,
        draft: NotificationDraft,
    ) -> Result<Notification, ClientError> {
        validate_form(&draft)?;
        let local = draft.to_pending(Utc::now());
        optimistic::create(list, local, Position::Front, self.create_notification(&draft)).await
    }

    pub async fn revise_notification(
        &self,
        list: &OptimisticList<Notification>,
        edited: Notification,
    ) -> Result<Notification, ClientError> {
        let id = edited.id;
        optimistic::update(list, id, edited, |diff| self.update_notification(id, diff)).await
    }

    pub async fn retract_notification(
        &self,
        list: &OptimisticList<Notification>,
        id: i64,
    ) -> Result<(), ClientError> {
        optimistic::delete(list, id, self.delete_notification(id)).await
    }
}
