// src/services/session_gate.rs

use std::{
    fs, io,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crate::common::error::AppError;

// Valor gravado no marcador de sessão ("hw_auth")
pub const SESSION_MARKER_VALUE: &str = "ok";

/// Marcador efêmero de sessão: lembra que a senha já foi aceita.
pub trait SessionMarker: Send + Sync {
    fn is_set(&self) -> bool;
    fn set(&self) -> Result<(), AppError>;
    fn clear(&self) -> Result<(), AppError>;
}

/// Marcador em arquivo temporário. Some quando o diretório temporário é limpo
/// ou quando a sessão é bloqueada.
pub struct FileSessionMarker {
    path: PathBuf,
}

impl FileSessionMarker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionMarker for FileSessionMarker {
    fn is_set(&self) -> bool {
        fs::read_to_string(&self.path)
            .map(|content| content.trim() == SESSION_MARKER_VALUE)
            .unwrap_or(false)
    }

    fn set(&self) -> Result<(), AppError> {
        fs::write(&self.path, SESSION_MARKER_VALUE)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Default)]
pub struct MemorySessionMarker {
    set: AtomicBool,
}

impl SessionMarker for MemorySessionMarker {
    fn is_set(&self) -> bool {
        self.set.load(Ordering::SeqCst)
    }

    fn set(&self) -> Result<(), AppError> {
        self.set.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        self.set.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Portão de acesso: uma senha compartilhada, comparada em texto puro.
#[derive(Clone)]
pub struct SessionGate {
    secret: Arc<str>,
    unlocked: Arc<AtomicBool>,
    marker: Arc<dyn SessionMarker>,
}

impl SessionGate {
    /// Cria o portão já restaurando o estado a partir do marcador.
    pub fn new(secret: impl Into<String>, marker: Arc<dyn SessionMarker>) -> Self {
        let restored = marker.is_set();
        if restored {
            tracing::info!("🔓 Sessão restaurada a partir do marcador");
        }
        Self {
            secret: Arc::from(secret.into()),
            unlocked: Arc::new(AtomicBool::new(restored)),
            marker,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked.load(Ordering::SeqCst)
    }

    /// Retorna `true` se a senha confere. O retorno é tudo: o aviso ao usuário
    /// fica com quem chamou.
    pub fn unlock(&self, candidate: &str) -> bool {
        if candidate != &*self.secret {
            tracing::warn!("Tentativa de desbloqueio com senha incorreta");
            return false;
        }

        self.unlocked.store(true, Ordering::SeqCst);
        if let Err(e) = self.marker.set() {
            // Continua desbloqueado neste processo; só não sobrevive a um reinício
            tracing::warn!("Não foi possível gravar o marcador de sessão: {}", e);
        }
        tracing::info!("🔓 Sessão desbloqueada");
        true
    }

    pub fn lock(&self) {
        self.unlocked.store(false, Ordering::SeqCst);
        if let Err(e) = self.marker.clear() {
            tracing::warn!("Não foi possível apagar o marcador de sessão: {}", e);
        }
        tracing::info!("🔒 Sessão bloqueada");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> (SessionGate, Arc<MemorySessionMarker>) {
        let marker = Arc::new(MemorySessionMarker::default());
        (SessionGate::new("2912", marker.clone()), marker)
    }

    #[test]
    fn wrong_secret_keeps_gate_locked() {
        let (gate, marker) = gate();
        assert!(!gate.unlock("1234"));
        assert!(!gate.is_unlocked());
        assert!(!marker.is_set());
    }

    #[test]
    fn right_secret_unlocks_and_persists_marker() {
        let (gate, marker) = gate();
        assert!(gate.unlock("2912"));
        assert!(gate.is_unlocked());
        assert!(marker.is_set());
    }

    #[test]
    fn lock_clears_flag_and_marker() {
        let (gate, marker) = gate();
        gate.unlock("2912");
        gate.lock();
        assert!(!gate.is_unlocked());
        assert!(!marker.is_set());
    }

    #[test]
    fn file_marker_restores_unlocked_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hw_auth");

        let first = SessionGate::new("2912", Arc::new(FileSessionMarker::new(&path)));
        assert!(!first.is_unlocked());
        assert!(first.unlock("2912"));

        // Um "recarregamento" na mesma sessão não pede a senha de novo
        let reloaded = SessionGate::new("2912", Arc::new(FileSessionMarker::new(&path)));
        assert!(reloaded.is_unlocked());

        reloaded.lock();
        assert!(!path.exists());
        let after_lock = SessionGate::new("2912", Arc::new(FileSessionMarker::new(&path)));
        assert!(!after_lock.is_unlocked());
    }

    #[test]
    fn clearing_a_missing_file_marker_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let marker = FileSessionMarker::new(dir.path().join("absent"));
        assert!(marker.clear().is_ok());
    }
}
