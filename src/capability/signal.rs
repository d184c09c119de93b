use std::sync::Arc;
use tokio::sync::watch;

/// Out-of-band control state, observed once per tick boundary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    #[default]
    Run,
    Pause,
    Stop,
}

/// Sending half, held by hotkey listeners.
#[derive(Debug, Clone)]
pub struct Remote(Arc<watch::Sender<Signal>>);

/// Receiving half, held by the control loop.
#[derive(Debug, Clone)]
pub struct Signals(watch::Receiver<Signal>);

pub fn signals() -> (Remote, Signals) {
    let (tx, rx) = watch::channel(Signal::Run);
    (Remote(Arc::new(tx)), Signals(rx))
}

impl Remote {
    pub fn pause(&self) {
        self.set(Signal::Pause);
    }
    pub fn resume(&self) {
        self.set(Signal::Run);
    }
    /// Hard stop wins over everything sent afterwards.
    pub fn stop(&self) {
        self.set(Signal::Stop);
    }
    fn set(&self, signal: Signal) {
        self.0.send_if_modified(|current| {
            if *current == Signal::Stop || *current == signal {
                false
            } else {
                *current = signal;
                true
            }
        });
    }
    /// Ctrl+C requests a hard stop. The in-flight tick still completes.
    pub fn on_ctrl_c(&self) {
        let remote = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("[signal] interrupt received, stopping after this tick");
                remote.stop();
            }
        });
    }
    /// Reads `p` / `r` / `q` lines from stdin as pause / resume / stop.
    pub fn on_stdin(&self) {
        let remote = self.clone();
        std::thread::spawn(move || {
            loop {
                let ref mut buffer = String::new();
                match std::io::stdin().read_line(buffer) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => match buffer.trim().to_lowercase().as_str() {
                        "p" => remote.pause(),
                        "r" => remote.resume(),
                        "q" => {
                            remote.stop();
                            break;
                        }
                        _ => continue,
                    },
                }
            }
        });
    }
}

impl Signals {
    /// A receiver that is never signalled.
    pub fn inert() -> Self {
        signals().1
    }
    pub fn current(&self) -> Signal {
        *self.0.borrow()
    }
    /// Waits until the signal is no longer `Pause`.
    pub async fn unpaused(&mut self) -> Signal {
        loop {
            let signal = *self.0.borrow_and_update();
            if signal != Signal::Pause {
                return signal;
            }
            if self.0.changed().await.is_err() {
                return Signal::Stop;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_is_sticky() {
        let (remote, signals) = signals();
        remote.pause();
        assert_eq!(signals.current(), Signal::Pause);
        remote.stop();
        remote.resume();
        assert_eq!(signals.current(), Signal::Stop);
    }

    #[tokio::test]
    async fn unpaused_waits_for_resume() {
        let (remote, mut signals) = signals();
        remote.pause();
        let waiter = tokio::spawn(async move { signals.unpaused().await });
        tokio::task::yield_now().await;
        remote.resume();
        assert_eq!(waiter.await.unwrap(), Signal::Run);
    }
}
