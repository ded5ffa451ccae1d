//! User profile and team roster.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Role carried by a profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Registered team leader
    Participant,
    /// Event administrator
    Admin,
}

/// Member listed on a team roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct TeamMember {
    /// Full name
    #[validate(length(min = 1, message = "Member name is required"))]
    pub name: String,
    /// Contact email
    #[validate(email(message = "Enter a valid email"))]
    pub email: String,
    /// Contact phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// One entry of a team's video submission history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoSubmission {
    /// Submitted video link
    pub link: String,
    /// When the link was submitted
    pub submitted_at: DateTime<Utc>,
}

/// Profile of the signed-in user. For participants this is also their team.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    /// Server identifier
    pub id: i64,
    /// Login email
    pub email: String,
    /// Registered team name
    #[serde(default)]
    pub team_name: String,
    /// Team leader's name
    #[serde(default)]
    pub leader_name: String,
    /// Leader's phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Institute the team represents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institute: Option<String>,
    /// Team roster
    #[serde(default)]
    pub members: Vec<TeamMember>,
    /// Video submission history, oldest first
    #[serde(default)]
    pub videos: Vec<VideoSubmission>,
    /// Whether the login email has been verified by OTP
    #[serde(default)]
    pub email_verified: bool,
    /// Whether the team has frozen its final video
    #[serde(default)]
    pub video_freeze: bool,
    /// Administrator flag
    #[serde(default)]
    pub is_admin: bool,
    /// Registration time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_joined: Option<DateTime<Utc>>,
}

/// Teams as listed by the admin endpoints are participant profiles.
pub type Team = UserProfile;

impl UserProfile {
    /// Role derived from the admin flag.
    pub const fn role(&self) -> Role {
        if self.is_admin {
            Role::Admin
        } else {
            Role::Participant
        }
    }

    /// Most recent video link, if any.
    pub fn latest_video(&self) -> Option<&VideoSubmission> {
        self.videos.last()
    }

    /// Whether another video may still be submitted.
    pub const fn can_submit_video(&self) -> bool {
        !self.video_freeze
    }
}
