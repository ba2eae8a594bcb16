use landed_shared::PricingEvent;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// In-process fan-out of pricing events. Subscribers that fall behind lose
/// the oldest events; publishing never blocks a quote.
#[derive(Clone)]
pub struct EventPublisher {
    tx: broadcast::Sender<PricingEvent>,
}

impl EventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PricingEvent> {
        self.tx.subscribe()
    }

    /// Returns the number of subscribers that received the event.
    pub fn publish(&self, event: PricingEvent) -> usize {
        let topic = event.topic();
        match self.tx.send(event) {
            Ok(receivers) => {
                info!("Published {} to {} subscriber(s)", topic, receivers);
                receivers
            }
            Err(_) => {
                debug!("No subscribers for {}", topic);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landed_shared::{event_timestamp, OverrideChangedEvent};

    fn changed() -> PricingEvent {
        PricingEvent::OverrideChanged(OverrideChangedEvent {
            scope: "global".to_string(),
            fields: vec!["vatPct".to_string()],
            deleted: false,
            timestamp: event_timestamp(),
        })
    }

    #[test]
    fn test_publish_without_subscribers() {
        let publisher = EventPublisher::new(8);
        assert_eq!(publisher.publish(changed()), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let publisher = EventPublisher::new(8);
        let mut rx = publisher.subscribe();

        assert_eq!(publisher.publish(changed()), 1);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.topic(), "override.changed");
    }
}
