use std::sync::Arc;
use tokio::sync::watch;

/// Publishing half of the component-list version. Bumped after every
/// successful submission so galleries know their cached lists are stale.
#[derive(Debug, Clone)]
pub struct ListInvalidator {
    tx: Arc<watch::Sender<u64>>,
}

/// Subscribing half. Each subscription tracks which version it last saw.
#[derive(Debug, Clone)]
pub struct ListSubscription {
    rx: watch::Receiver<u64>,
}

pub fn list_version_channel() -> (ListInvalidator, ListSubscription) {
    let (tx, rx) = watch::channel(0);
    (ListInvalidator { tx: Arc::new(tx) }, ListSubscription { rx })
}

impl ListInvalidator {
    pub fn invalidate(&self) {
        self.tx.send_modify(|version| *version += 1);
    }

    pub fn subscribe(&self) -> ListSubscription {
        ListSubscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn version(&self) -> u64 {
        *self.tx.borrow()
    }
}

impl ListSubscription {
    /// Returns true once per version bump, then false until the next one.
    pub fn take_change(&mut self) -> bool {
        match self.rx.has_changed() {
            Ok(true) => {
                self.rx.borrow_and_update();
                true
            }
            _ => false,
        }
    }

    /// Waits for the next bump. Returns false once the publisher is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_bump_is_observed_once() {
        let (invalidator, mut subscription) = list_version_channel();
        assert!(!subscription.take_change());

        invalidator.invalidate();
        invalidator.invalidate();
        assert_eq!(invalidator.version(), 2);
        assert!(subscription.take_change());
        assert!(!subscription.take_change());
    }

    #[test]
    fn late_subscribers_start_at_the_current_version() {
        let (invalidator, _first) = list_version_channel();
        invalidator.invalidate();

        let mut late = invalidator.subscribe();
        assert!(!late.take_change());
        invalidator.invalidate();
        assert!(late.take_change());
    }

    #[tokio::test]
    async fn changed_wakes_on_invalidate_and_ends_with_publisher() {
        let (invalidator, mut subscription) = list_version_channel();

        let waiter = tokio::spawn(async move {
            let woke = subscription.changed().await;
            (woke, subscription)
        });
        invalidator.invalidate();
        let (woke, mut subscription) = waiter.await.unwrap();
        assert!(woke);

        drop(invalidator);
        assert!(!subscription.changed().await);
    }
}
