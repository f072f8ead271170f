//! Kommando-Handler
//!
//! Jeder Handler nimmt den DatenService und die bereits validierten
//! Argumente entgegen und gibt die Payload-Form der Antwort zurueck.
//! Fehlerbehandlung (Domaenenfehler -> error-Nachricht) liegt beim
//! Dispatcher.

pub mod bestand_handler;
pub mod leihe_handler;
