// src/common/events.rs

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Qual coleção mudou. As telas dependentes recarregam seus agregados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    Accounts,
    Transactions,
    Bills,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub owner_id: Uuid,
    pub kind: ChangeKind,
}

/// Registro de assinantes das mudanças de domínio.
///
/// Pertence ao `AppState` e é injetado nos serviços; os serviços só
/// publicam depois que a escrita foi confirmada pelo banco.
#[derive(Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, owner_id: Uuid, kind: ChangeKind) {
        let event = ChangeEvent { owner_id, kind };
        // Sem assinantes o envio falha, e tudo bem: ninguém precisa recarregar.
        match self.sender.send(event) {
            Ok(receivers) => tracing::debug!(?event, receivers, "Mudança publicada"),
            Err(_) => tracing::debug!(?event, "Mudança publicada sem assinantes"),
        }
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}
