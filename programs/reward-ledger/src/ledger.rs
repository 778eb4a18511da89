use crate::clock::{Clock, SystemClock};
use crate::error::{ErrorCode, Result};
use crate::instructions::{self, Context, TaskVerifier, TrustingVerifier};
use crate::jobs::{DeferredJobs, JobKind};
use crate::notify::{NotificationPort, OutboundMessage};
use crate::policy::{PrizePicker, ThreadRngPicker};
use crate::states::*;
use crate::store::UserStore;
use log::{info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Collaborators with sensible production defaults, swappable for tests.
pub struct LedgerBuilder {
    config: RewardConfig,
    clock: Arc<dyn Clock>,
    picker: Arc<dyn PrizePicker>,
    verifier: Arc<dyn TaskVerifier>,
}

impl LedgerBuilder {
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn picker(mut self, picker: Arc<dyn PrizePicker>) -> Self {
        self.picker = picker;
        self
    }

    pub fn verifier(mut self, verifier: Arc<dyn TaskVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Validates the configuration and opens `store`.
    pub fn open<N: NotificationPort>(
        self,
        store: Arc<dyn UserStore>,
        notifier: Arc<N>,
    ) -> Result<RewardLedger<N>> {
        self.config.validate()?;
        store.open()?;
        info!(
            "reward ledger opened: {} spins, {} quiz attempts, {} ms window",
            self.config.max_spin_attempts, self.config.max_quiz_attempts, self.config.reset_window_ms
        );
        Ok(RewardLedger {
            inner: Arc::new(LedgerInner {
                config: self.config,
                store,
                clock: self.clock,
                picker: self.picker,
                verifier: self.verifier,
                notifier,
                locks: Mutex::new(HashMap::new()),
                jobs: DeferredJobs::new(),
            }),
        })
    }
}

struct LedgerInner<N> {
    config: RewardConfig,
    store: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
    picker: Arc<dyn PrizePicker>,
    verifier: Arc<dyn TaskVerifier>,
    notifier: Arc<N>,
    /// One lock per user id; never pruned, matching record lifetime.
    locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
    jobs: DeferredJobs,
}

/// Single owner of all per-user reward state.
///
/// Every operation runs as one read-modify-write inside that user's critical
/// section: load (or create) the record, apply the lazy daily reset, run the
/// rule, write back. Operations on different users never contend; operations
/// on the same user are serialized. Cloning is cheap and shares state.
pub struct RewardLedger<N> {
    inner: Arc<LedgerInner<N>>,
}

impl<N> Clone for RewardLedger<N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl RewardLedger<()> {
    pub fn builder(config: RewardConfig) -> LedgerBuilder {
        LedgerBuilder {
            config,
            clock: Arc::new(SystemClock),
            picker: Arc::new(ThreadRngPicker),
            verifier: Arc::new(TrustingVerifier),
        }
    }
}

impl<N: NotificationPort> RewardLedger<N> {
    pub fn config(&self) -> &RewardConfig {
        &self.inner.config
    }

    pub fn jobs(&self) -> &DeferredJobs {
        &self.inner.jobs
    }

    fn user_lock(&self, user_id: &UserId) -> Result<Arc<Mutex<()>>> {
        let mut locks = self
            .inner
            .locks
            .lock()
            .map_err(|_| ErrorCode::StoreUnavailable)?;
        Ok(Arc::clone(locks.entry(user_id.clone()).or_default()))
    }

    fn with_user<T>(&self, user_id: &UserId, op: impl FnOnce(Context<'_>) -> Result<T>) -> Result<T> {
        let lock = self.user_lock(user_id)?;
        let _guard = lock.lock().map_err(|_| ErrorCode::StoreUnavailable)?;

        let inner = &self.inner;
        let now = inner.clock.now_ms();
        let mut record = match inner.store.get(user_id)? {
            Some(record) => record,
            None => {
                info!("creating reward record for user {}", user_id);
                UserRecord::new(&inner.config)
            }
        };
        instructions::apply_daily_reset(&mut record, &inner.config, now);

        let outcome = op(Context {
            record: &mut record,
            config: &inner.config,
            now,
        });
        // Rejected operations leave the record untouched apart from creation
        // and the lazy reset, both of which are kept.
        inner.store.upsert(user_id, &record)?;
        outcome
    }

    /// Returns the user's record, creating it with catalog defaults on first use.
    pub fn get_or_create(&self, user_id: &UserId) -> Result<UserRecord> {
        self.with_user(user_id, |ctx| Ok(ctx.record.clone()))
    }

    pub fn request_snapshot(&self, user_id: &UserId) -> Result<Snapshot> {
        self.with_user(user_id, |ctx| Ok(instructions::request_snapshot(ctx)))
    }

    pub fn spin(&self, user_id: &UserId) -> Result<SpinResult> {
        let picker = Arc::clone(&self.inner.picker);
        self.with_user(user_id, |ctx| instructions::spin(ctx, picker.as_ref()))
    }

    pub fn claim_daily_bonus(&self, user_id: &UserId) -> Result<BonusResult> {
        self.with_user(user_id, instructions::claim_daily_bonus)
    }

    /// Verifies `task_id` for the user and, on success, queues a notice.
    pub async fn verify_task(
        &self,
        user_id: &UserId,
        task_id: &str,
        client_points: Option<i64>,
    ) -> Result<TaskResult> {
        let verifier = Arc::clone(&self.inner.verifier);
        let result = self.with_user(user_id, |ctx| {
            instructions::verify_task(ctx, user_id, task_id, client_points, verifier.as_ref())
        })?;

        if let TaskResult::Verified {
            task_id,
            points_gained,
            ..
        } = &result
        {
            info!("user {} completed task {} (+{})", user_id, task_id, points_gained);
            let notice = OutboundMessage::text(format!(
                "Task {} verified! You earned {} points.",
                task_id, points_gained
            ));
            self.notify_later(JobKind::TaskNotice, user_id, notice);
        }
        Ok(result)
    }

    /// Records a pending checkout and returns straight away.
    ///
    /// Two tracked jobs follow: a notice to the user, and the mock confirmation
    /// that, after `payment_confirm_delay`, credits the balance and sends a
    /// second notice. Neither is awaited here, neither is retried, and both are
    /// dropped if the ledger closes first.
    pub async fn initiate_payment(
        &self,
        user_id: &UserId,
        total_amount: Option<f64>,
        items: Vec<serde_json::Value>,
    ) -> Result<PaymentInitiated> {
        let initiated = self.with_user(user_id, |ctx| {
            instructions::initiate_payment(ctx, total_amount, items)
        })?;
        info!(
            "user {} initiated payment #{} of {} for {} item(s)",
            user_id, initiated.payment_id, initiated.total_amount, initiated.item_count
        );

        let notice = OutboundMessage::text(format!(
            "💰 Payment started!\nTotal amount: {} Birr.\n\n\
             Please complete the payment via Telebirr or another payment method.\n\n\
             Once your payment is confirmed, your {} book file(s) will be delivered here!",
            initiated.total_amount, initiated.item_count
        ));
        self.notify_later(JobKind::PaymentNotice, user_id, notice);

        let ledger = self.clone();
        let owner = user_id.clone();
        let payment_id = initiated.payment_id;
        let delay = self.inner.config.payment_confirm_delay;
        self.inner
            .jobs
            .spawn(JobKind::PaymentConfirmation, user_id.clone(), async move {
                tokio::time::sleep(delay).await;
                let confirmed = ledger.with_user(&owner, |ctx| {
                    instructions::confirm_payment(ctx, payment_id)
                })?;
                info!(
                    "user {} payment #{} confirmed, balance {}",
                    owner, confirmed.payment_id, confirmed.new_balance
                );
                let notice = OutboundMessage::text(format!(
                    "✅ Payment of {} Birr confirmed. Your balance is now {}.",
                    confirmed.total_amount, confirmed.new_balance
                ));
                ledger.inner.notifier.send_message(&owner, notice).await
            });

        Ok(initiated)
    }

    fn notify_later(&self, kind: JobKind, user_id: &UserId, message: OutboundMessage) {
        let notifier = Arc::clone(&self.inner.notifier);
        let chat_id = user_id.clone();
        self.inner.jobs.spawn(kind, user_id.clone(), async move {
            notifier.send_message(&chat_id, message).await
        });
    }

    /// Aborts outstanding deferred jobs and closes the store.
    pub fn close(&self) -> Result<()> {
        let aborted = self.inner.jobs.abort_all();
        if aborted > 0 {
            warn!("abandoning {} deferred job(s) on close", aborted);
        }
        self.inner.store.close()?;
        info!("reward ledger closed");
        Ok(())
    }
}
