/// Protocole filaire de pachylog : messages sortants et commandes entrantes.
///
/// Les composants internes manipulent uniquement des types à variantes
/// taguées ; la représentation textuelle n'existe qu'à la frontière
/// encode/decode de ce crate. Une ligne ASCII par message, champs séparés
/// par des virgules.

pub mod command;
pub mod message;

pub use command::Command;
pub use message::Message;
