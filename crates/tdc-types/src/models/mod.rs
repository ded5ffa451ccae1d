//! Domain models for the Thapar Drone Challenge API.

mod auth;
mod notification;
mod ticket;
mod user;

pub use auth::{
    AddVideoRequest, AuthResponse, LoginRequest, OtpRequest, RegisterRequest,
    ResetPasswordRequest, VerifyOtpRequest,
};
pub use notification::{Notification, NotificationDraft};
pub use ticket::{CreateTicketRequest, Message, SendMessageRequest, Ticket, TicketRef, TicketStatus};
pub use user::{Role, Team, TeamMember, UserProfile, VideoSubmission};
