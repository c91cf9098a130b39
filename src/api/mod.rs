// ============================================================================
// Module : api
// ============================================================================
// Clients HTTP vers les plateformes d'échange
// ============================================================================

pub mod kucoin; // Client KuCoin Earn

// Re-export du client principal
pub use kucoin::{KucoinClient, DEFAULT_RATES_URL};
