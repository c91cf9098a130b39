// ============================================================================
// KuCoin Earn Bot - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;       // Client HTTP KuCoin
pub mod app;       // État partagé du bot
pub mod bot;       // Handlers Telegram
pub mod config;    // Configuration depuis l'environnement
pub mod error;     // Erreurs du domaine
pub mod models;    // Structures de données
pub mod refresh;   // Mises à jour périodiques par chat
pub mod transform; // Filtre / tri des offres
pub mod ui;        // Rendu des messages et claviers
