// ============================================================================
// Rafraîchissement périodique par chat
// ============================================================================
// Chaque chat peut avoir UN abonnement aux mises à jour (tap sur le bouton
// KuCoin). L'abonnement est une tâche tokio qui rejoue le cycle
// fetch -> transform -> render -> reply à intervalle fixe.
//
// CONCEPTS RUST :
// 1. HashMap<ChatId, Subscription> : un slot par chat, pas de slot global
// 2. std::sync::Mutex : verrou court, jamais conservé pendant un .await
// 3. Drop : annuler la tâche quand l'abonnement est détruit (RAII)
// 4. tokio::sync::Notify : signal d'arrêt lu entre deux ticks, jamais
//    pendant un cycle (un cycle commencé va jusqu'au bout)
//
// Règles :
// - démarrer un abonnement pour un chat qui en a déjà un annule l'ancien
//   explicitement avant de le remplacer
// - les autres chats ne sont jamais touchés
// - une erreur pendant un tick est loggée, le tick suivant a lieu quand même
// - l'annulation coupe le minuteur, pas le cycle en cours : un fetch déjà
//   lancé se termine et sa réponse est envoyée
// ============================================================================

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use teloxide::types::ChatId;
use tokio::sync::Notify;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Un abonnement actif : le signal d'arrêt de sa tâche et sa date de démarrage
#[derive(Debug)]
pub struct Subscription {
    stop: Arc<Notify>,
    started_at: DateTime<Utc>,
}

impl Subscription {
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

impl Drop for Subscription {
    // Un abonnement qui disparaît n'a plus de propriétaire : on arrête la tâche.
    // notify_one garde le signal si la tâche est en plein cycle.
    fn drop(&mut self) {
        self.stop.notify_one();
    }
}

/// Registre des abonnements, partagé entre tous les handlers
#[derive(Debug, Default)]
pub struct RefreshRegistry {
    slots: Mutex<HashMap<ChatId, Subscription>>,
}

impl RefreshRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verrouille la table (un verrou empoisonné reste utilisable :
    /// la HashMap n'a pas d'invariant qu'un panic pourrait casser)
    fn slots(&self) -> MutexGuard<'_, HashMap<ChatId, Subscription>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Démarre les mises à jour périodiques d'un chat
    ///
    /// Le premier tick a lieu après une période complète : l'appelant
    /// envoie lui-même la première réponse.
    ///
    /// Retourne true si un abonnement existant a été remplacé.
    ///
    /// CONCEPT RUST : Closure qui produit des Futures
    /// - F: FnMut() -> Fut : appelée à chaque tick
    /// - Fut: Future + Send + 'static : exécutée dans une tâche tokio
    pub fn start<F, Fut>(&self, chat_id: ChatId, period: Duration, mut tick: F) -> bool
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let stop = Arc::new(Notify::new());
        let stopped = stop.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                // biased : un arrêt déjà signalé passe avant un tick en retard
                tokio::select! {
                    biased;
                    _ = stopped.notified() => break,
                    _ = ticker.tick() => {}
                }

                debug!(chat_id = chat_id.0, "Periodic refresh tick");
                if let Err(e) = tick().await {
                    warn!(chat_id = chat_id.0, error = ?e, "Periodic refresh failed");
                }
            }

            debug!(chat_id = chat_id.0, "Periodic refresh task finished");
        });

        let subscription = Subscription {
            stop,
            started_at: Utc::now(),
        };

        let mut slots = self.slots();
        let replaced = match slots.remove(&chat_id) {
            Some(previous) => {
                info!(
                    chat_id = chat_id.0,
                    since = %previous.started_at,
                    "Cancelling previous refresh before starting a new one"
                );
                drop(previous);
                true
            }
            None => false,
        };
        slots.insert(chat_id, subscription);

        info!(chat_id = chat_id.0, period_secs = period.as_secs(), replaced, "Periodic refresh started");
        replaced
    }

    /// Arrête les mises à jour d'un chat
    ///
    /// Retourne la date de démarrage de l'abonnement annulé, ou None si
    /// aucun abonnement ne tournait pour ce chat.
    pub fn stop(&self, chat_id: ChatId) -> Option<DateTime<Utc>> {
        let removed = self.slots().remove(&chat_id)?;
        let started_at = removed.started_at();
        drop(removed);

        info!(chat_id = chat_id.0, since = %started_at, "Periodic refresh stopped");
        Some(started_at)
    }

    pub fn is_active(&self, chat_id: ChatId) -> bool {
        self.slots().contains_key(&chat_id)
    }

    /// Nombre de chats abonnés
    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
// CONCEPT : Horloge tokio en pause
// - start_paused = true : le temps n'avance que quand tout le monde attend
// - un sleep de 15 minutes dure quelques microsecondes en vrai
// ============================================================================
