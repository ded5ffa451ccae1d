use super::{field_error, paths};
use crate::cache::{optimistic, OptimisticList, Position, QueryKey, Tag};
use crate::error::ClientError;
use crate::transport::RequestDescriptor;
use crate::TdcClient;
use chrono::Utc;
use tdc_types::error::validate_form;
use tdc_types::{CreateTicketRequest, Message, SendMessageRequest, Ticket, TicketRef, TicketStatus};

impl TdcClient {
    /// Tickets visible to the signed-in user (all tickets for admins),
    /// messages in creation order.
    pub async fn tickets(&self) -> Result<Vec<Ticket>, ClientError> {
        let mut tickets: Vec<Ticket> = self
            .query(
                QueryKey::new(paths::TICKETS),
                &[Tag::Tickets],
                RequestDescriptor::get(paths::TICKETS),
            )
            .await?;
        tickets.iter_mut().for_each(Ticket::sort_messages);
        Ok(tickets)
    }

    pub async fn create_ticket(&self, form: &CreateTicketRequest) -> Result<Ticket, ClientError> {
        validate_form(form)?;
        let mut ticket: Ticket =
            self.send(RequestDescriptor::post(paths::CREATE_TICKET).json(form)?).await?;
        ticket.sort_messages();
        self.invalidate(&[Tag::Tickets]);
        Ok(ticket)
    }

    /// Post to a ticket. Tickets known to be closed are rejected locally.
    pub async fn send_message(&self, form: &SendMessageRequest) -> Result<Message, ClientError> {
        validate_form(form)?;
        let cached: Option<Vec<Ticket>> = self.cache().get_fresh(&QueryKey::new(paths::TICKETS));
        let closed = cached
            .is_some_and(|tickets| tickets.iter().any(|t| t.id == form.ticket && !t.is_open()));
        if closed {
            return Err(field_error("content", "Ticket is closed"));
        }
        let message = self.send(RequestDescriptor::post(paths::SEND_MESSAGE).json(form)?).await?;
        self.invalidate(&[Tag::Tickets]);
        Ok(message)
    }

    pub async fn mark_as_read(&self, ticket: i64) -> Result<(), ClientError> {
        let request = RequestDescriptor::post(paths::MARK_AS_READ).json(&TicketRef { ticket })?;
        self.send_empty(request).await?;
        self.invalidate(&[Tag::Tickets]);
        Ok(())
    }

    pub async fn mark_as_closed(&self, ticket: i64) -> Result<(), ClientError> {
        let request = RequestDescriptor::post(paths::MARK_AS_CLOSED).json(&TicketRef { ticket })?;
        self.send_empty(request).await?;
        self.invalidate(&[Tag::Tickets]);
        Ok(())
    }

    // ===== optimistic chat =====

    /// Show a new ticket at the top of `list`, then create it.
    pub async fn open_ticket(
        &self,
        list: &OptimisticList<Ticket>,
        form: CreateTicketRequest,
    ) -> Result<Ticket, ClientError> {
        validate_form(&form)?;
        let now = Utc::now();
        let local = Ticket {
            id: 0,
            subject: form.subject.clone(),
            status: TicketStatus::Open,
            team_name: self.session().user().map(|u| u.team_name),
            created_at: now,
            messages: vec![Message {
                id: list.next_temp_id(),
                ticket: 0,
                content: form.message.clone(),
                is_admin: self.viewer_is_admin(),
                is_read: false,
                created_at: now,
            }],
        };
        optimistic::create(list, local, Position::Front, self.create_ticket(&form)).await
    }

    /// Append a message to the ticket in `list` at once, then send it.
    ///
    /// The local message carries a negative id until the server's copy
    /// replaces it.
    pub async fn post_message(
        &self,
        list: &OptimisticList<Ticket>,
        ticket: i64,
        content: &str,
    ) -> Result<Message, ClientError> {
        let form = SendMessageRequest { ticket, content: content.to_string() };
        validate_form(&form)?;
        let current = list
            .get(ticket)
            .ok_or_else(|| ClientError::NotFound(format!("ticket {} is not loaded", ticket)))?;
        if !current.is_open() {
            return Err(field_error("content", "Ticket is closed"));
        }

        let temp_id = list.next_temp_id();
        let local = Message {
            id: temp_id,
            ticket,
            content: form.content.clone(),
            is_admin: self.viewer_is_admin(),
            is_read: false,
            created_at: Utc::now(),
        };
        let Some(previous) = list.modify(ticket, |t| t.messages.push(local)) else {
            return Err(ClientError::NotFound(format!("ticket {} is not loaded", ticket)));
        };

        match self.send_message(&form).await {
            Ok(server) => {
                list.settle(ticket, |t| {
                    t.messages.retain(|m| m.id != temp_id && m.id != server.id);
                    t.messages.push(server.clone());
                    t.sort_messages();
                });
                Ok(server)
            },
            Err(e) => {
                tracing::warn!("Message to ticket {} rolled back: {}", ticket, e);
                list.restore(ticket, previous);
                Err(ClientError::rollback(e))
            },
        }
    }

    /// Mark the viewer's unread messages read locally, then on the server.
    /// Returns how many messages changed; nothing is sent when none were unread.
    pub async fn read_ticket(
        &self,
        list: &OptimisticList<Ticket>,
        ticket: i64,
    ) -> Result<usize, ClientError> {
        let viewer = self.viewer_is_admin();
        let mut changed = 0;
        let previous = list
            .modify(ticket, |t| changed = t.mark_read_for(viewer))
            .ok_or_else(|| ClientError::NotFound(format!("ticket {} is not loaded", ticket)))?;
        if changed == 0 {
            list.restore(ticket, previous);
            return Ok(0);
        }

        match self.mark_as_read(ticket).await {
            Ok(()) => {
                list.settle(ticket, |_| {});
                Ok(changed)
            },
            Err(e) => {
                list.restore(ticket, previous);
                Err(ClientError::rollback(e))
            },
        }
    }

    pub async fn close_ticket(
        &self,
        list: &OptimisticList<Ticket>,
        ticket: i64,
    ) -> Result<(), ClientError> {
        let previous = list
            .modify(ticket, |t| t.status = TicketStatus::Closed)
            .ok_or_else(|| ClientError::NotFound(format!("ticket {} is not loaded", ticket)))?;

        match self.mark_as_closed(ticket).await {
            Ok(()) => {
                list.settle(ticket, |_| {});
                Ok(())
            },
            Err(e) => {
                list.restore(ticket, previous);
                Err(ClientError::rollback(e))
            },
        }
    }

    fn viewer_is_admin(&self) -> bool {
        self.session().user().is_some_and(|u| u.is_admin)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::error::ErrorKind;
    use crate::session::SessionStore;
    use crate::testing::ScriptedTransport;
    use std::sync::Arc;

    fn ticket(id: i64, status: TicketStatus) -> Ticket {
        Ticket {
            id,
            subject: "Battery spec".to_string(),
            status,
            team_name: None,
            created_at: Utc::now(),
            messages: vec![Message {
                id: 10,
                ticket: id,
                content: "Is 4S allowed?".to_string(),
                is_admin: false,
                is_read: true,
                created_at: Utc::now(),
            }],
        }
    }

    fn offline() -> (Arc<ScriptedTransport>, TdcClient) {
        let transport = Arc::new(ScriptedTransport::new());
        let client = TdcClient::with_transport(
            ClientConfig::default(),
            SessionStore::new(),
            transport.clone(),
        );
        (transport, client)
    }

    #[tokio::test]
    async fn test_closed_ticket_rejects_message_locally() {
        let (transport, client) = offline();
        let list = OptimisticList::from_items(vec![ticket(1, TicketStatus::Closed)]);

        let err = client.post_message(&list, 1, "hello?").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.field_errors().unwrap().contains_key("content"));
        assert_eq!(list.get(1).unwrap().messages.len(), 1);
        assert!(transport.bearers().is_empty());
    }

    #[tokio::test]
    async fn test_failed_send_removes_local_message() {
        let (_, client) = offline();
        let list = OptimisticList::from_items(vec![ticket(1, TicketStatus::Open)]);

        let err = client.post_message(&list, 1, "any update?").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Rollback);
        assert_eq!(list.get(1).unwrap().messages.len(), 1);
        assert_eq!(list.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_read_with_nothing_unread_sends_nothing() {
        let (transport, client) = offline();
        let list = OptimisticList::from_items(vec![ticket(1, TicketStatus::Open)]);

        assert_eq!(client.read_ticket(&list, 1).await.unwrap(), 0);
        assert!(transport.bearers().is_empty());
    }
}
