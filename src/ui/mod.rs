// ============================================================================
// Module : ui
// ============================================================================
// Tout ce que l'utilisateur voit dans Telegram
// ============================================================================

pub mod keyboards; // Boutons inline et textes fixes
pub mod reply;     // Rendu HTML des offres

// Re-exports pour simplifier les imports
pub use reply::{compose_reply, render};
