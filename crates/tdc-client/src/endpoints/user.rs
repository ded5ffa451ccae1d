use super::{field_error, paths};
use crate::cache::{json_diff, QueryKey, Tag};
use crate::error::ClientError;
use crate::transport::RequestDescriptor;
use crate::TdcClient;
use serde_json::{Map, Value};
use tdc_types::error::validate_form;
use tdc_types::{AddVideoRequest, Notification, UserProfile, VideoSubmission};

impl TdcClient {
    /// Signed-in team's profile. The session copy is replaced with it.
    pub async fn user_details(&self) -> Result<UserProfile, ClientError> {
        let profile: UserProfile = self
            .query(
                QueryKey::new(paths::USER_DETAILS),
                &[Tag::User],
                RequestDescriptor::get(paths::USER_DETAILS),
            )
            .await?;
        if self.session().is_authenticated() {
            self.session().set_user(profile.clone());
        }
        Ok(profile)
    }

    /// PATCH only the fields in `diff`.
    pub async fn update_details(
        &self,
        diff: Map<String, Value>,
    ) -> Result<UserProfile, ClientError> {
        let request = RequestDescriptor::patch(paths::USER_DETAILS).json(&diff)?;
        let profile: UserProfile = self.send(request).await?;
        self.session().set_user(profile.clone());
        self.invalidate(&[Tag::User, Tag::Teams]);
        Ok(profile)
    }

    /// Save an edited copy of the profile, sending only what differs from
    /// the session copy.
    pub async fn edit_details(&self, edited: &UserProfile) -> Result<UserProfile, ClientError> {
        let current = match self.session().user() {
            Some(user) => user,
            None => self.user_details().await?,
        };
        let diff = json_diff(&current, edited);
        if diff.is_empty() {
            return Ok(current);
        }
        self.update_details(diff).await
    }

    pub async fn user_notifications(&self) -> Result<Vec<Notification>, ClientError> {
        self.query(
            QueryKey::new(paths::USER_NOTIFICATIONS),
            &[Tag::Notifications],
            RequestDescriptor::get(paths::USER_NOTIFICATIONS),
        )
        .await
    }

    /// Submit a video link. Rejected locally once submissions are frozen.
    pub async fn add_video(&self, link: &str) -> Result<VideoSubmission, ClientError> {
        if self.session().user().is_some_and(|u| !u.can_submit_video()) {
            return Err(field_error("link", "Video submissions are frozen"));
        }
        let form = AddVideoRequest { link: link.to_string() };
        validate_form(&form)?;

        let video: VideoSubmission =
            self.send(RequestDescriptor::post(paths::ADD_VIDEO).json(&form)?).await?;
        self.session().append_video(video.clone());
        self.invalidate(&[Tag::User, Tag::Teams]);
        Ok(video)
    }

    /// Lock in the latest video. Irreversible.
    pub async fn freeze_video(&self) -> Result<(), ClientError> {
        self.send_empty(RequestDescriptor::post(paths::FREEZE_VIDEO)).await?;
        self.session().freeze_video();
        self.invalidate(&[Tag::User, Tag::Teams]);
        Ok(())
    }
}
