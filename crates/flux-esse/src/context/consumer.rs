use crate::actions::Actions;
use crate::spec::StoreData;
use crate::store::{Snapshot, Store, StoreAndActions};
use std::fmt;
use tokio::sync::watch;

/// A descendant's handle on the store of its nearest provider
pub struct Consumer<S> {
    store: Store<S>,
    receiver: watch::Receiver<Snapshot<S>>,
}

impl<S: StoreData> Consumer<S> {
    pub(crate) fn new(store: Store<S>) -> Self {
        let receiver = store.subscribe();
        Self { store, receiver }
    }

    /// Latest committed snapshot
    pub fn store(&self) -> Snapshot<S> {
        self.store.snapshot()
    }

    pub fn actions(&self) -> &Actions<S> {
        self.store.actions()
    }

    pub fn store_and_actions(&self) -> StoreAndActions<S> {
        self.store.store_and_actions()
    }

    /// Wait for the next generation committed after the last one seen here
    pub async fn changed(&mut self) -> Option<Snapshot<S>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Whether a generation was committed since the last [`changed`](Self::changed)
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }
}

impl<S: fmt::Debug + StoreData> fmt::Debug for Consumer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::context::{create_context, use_context, Env};
    use crate::draft::Draft;
    use crate::spec::StoreSpec;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[derive(Clone, Debug, Default)]
    struct Counter {
        b: u32,
    }

    fn counter_spec() -> StoreSpec<Counter> {
        StoreSpec::new(Counter::default()).action("a", |c: &mut Draft<Counter>, ()| c.b += 1)
    }

    #[tokio::test]
    async fn test_changed_follows_dispatch() {
        let context = create_context(counter_spec());
        let page = context.provider().mount(&Env::root()).unwrap();
        let mut view = use_context::<Counter>(page.env(), &context).unwrap();
        assert!(!view.has_changed());

        let a = view.actions().get::<()>("a").unwrap();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            a.call(());
        });

        let next = tokio::time::timeout(Duration::from_secs(1), view.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(next.b, 1);
        assert_eq!(next.generation(), 1);
        assert!(!view.has_changed());
    }

    #[tokio::test]
    async fn test_reacting_to_changes() {
        // A consumer that answers every change of `b` with another action
        let context = create_context(
            counter_spec().action("c", |c: &mut Draft<Counter>, ()| c.b += 10),
        );
        let page = context.provider().mount(&Env::root()).unwrap();
        let mut watcher = use_context::<Counter>(page.env(), &context).unwrap();
        let actions = watcher.actions().clone();

        actions.dispatch("a", ());
        let seen = watcher.changed().await.unwrap();
        assert_eq!(seen.b, 1);
        actions.dispatch("c", ());

        assert_eq!(watcher.changed().await.unwrap().b, 11);
        assert_eq!(watcher.store().generation(), 2);
    }
}
