//! Runtime orchestration for a Herald agent.
//!
//! The [`Runtime`] owns the [`Robot`] and its adapter. It spawns the
//! adapter's inbound event loop, pumps normalized messages into
//! [`Robot::receive`] one at a time, and shuts everything down on ctrl-c.
//!
//! Script loading stays external by design: plugins are just code that calls
//! the robot's registration API during the setup phase, before
//! [`run`](Runtime::run).
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use herald_runtime::Runtime;
//!
//! let mut runtime = Runtime::new(adapter)?;
//!
//! runtime.robot_mut().respond("(?i)ping", Default::default(), |ctx| async move {
//!     ctx.response().reply(&["pong"]).await
//! })?;
//!
//! runtime.run().await?;
//! ```

use std::sync::Arc;

use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use herald_core::{BoxedAdapter, Robot};

use crate::config::HeraldConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// Owns a robot and drives it from an adapter's event stream.
pub struct Runtime {
    config: HeraldConfig,
    robot: Robot,
    shutdown: CancellationToken,
}

impl Runtime {
    /// Creates a runtime with automatic configuration loading.
    ///
    /// Loads `herald.toml` plus `HERALD_*` environment overrides and
    /// initializes logging from the result.
    pub fn new(adapter: BoxedAdapter) -> RuntimeResult<Self> {
        let config = HeraldConfig::load()?;
        logging::init_from_config(&config.logging);
        Ok(Self::from_config(config, adapter))
    }

    /// Creates a runtime from a pre-loaded configuration.
    ///
    /// Does not touch logging; call
    /// [`logging::init_from_config`](crate::logging::init_from_config)
    /// yourself if you want it.
    pub fn from_config(config: HeraldConfig, adapter: BoxedAdapter) -> Self {
        let robot = Robot::new(config.name.clone(), config.alias.clone(), adapter);
        Self {
            config,
            robot,
            shutdown: CancellationToken::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &HeraldConfig {
        &self.config
    }

    /// Returns the robot.
    pub fn robot(&self) -> &Robot {
        &self.robot
    }

    /// Returns the robot mutably, for setup-phase registration.
    pub fn robot_mut(&mut self) -> &mut Robot {
        &mut self.robot
    }

    /// Returns a token that cancels the runtime when triggered.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Runs until the adapter disconnects or shutdown is requested.
    ///
    /// Messages are dispatched sequentially: the next message is not pulled
    /// from the channel until the previous dispatch has completed. Dispatch
    /// errors (receive-middleware failures) are reported through the robot's
    /// error channel; they never stop the loop.
    pub async fn run(self) -> RuntimeResult<()> {
        let (events_tx, mut events_rx) = mpsc::channel(self.config.event_buffer);

        let adapter = Arc::clone(self.robot.adapter());
        let adapter_shutdown = self.shutdown.clone();
        let adapter_task = tokio::spawn(async move {
            adapter.run(events_tx, adapter_shutdown).await
        });

        self.robot.fire_ready();
        info!(
            name = %self.robot.name(),
            adapter = %self.robot.adapter().name(),
            "herald is ready"
        );

        loop {
            tokio::select! {
                _ = signal::ctrl_c() => {
                    info!("shutdown requested");
                    self.shutdown.cancel();
                    break;
                }
                _ = self.shutdown.cancelled() => {
                    debug!("shutdown token cancelled");
                    break;
                }
                event = events_rx.recv() => match event {
                    Some(message) => {
                        if let Err(err) = self.robot.receive(message).await {
                            self.robot.errors().report(&err, None);
                        }
                    }
                    None => {
                        info!("adapter event stream closed");
                        break;
                    }
                },
            }
        }

        // Stop the adapter loop even when we exited because the event
        // stream closed on its own.
        self.shutdown.cancel();

        if let Err(err) = self.robot.adapter().close().await {
            warn!(error = %err, "adapter close failed");
        }

        match adapter_task.await {
            Ok(result) => result?,
            Err(err) => {
                return Err(RuntimeError::internal(format!(
                    "adapter task panicked: {err}"
                )));
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("name", &self.config.name)
            .field("robot", &self.robot)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use herald_core::{Adapter, AdapterResult, Envelope, Message, User};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Feeds a fixed script of messages, then cancels the runtime.
    struct ScriptedAdapter {
        script: Vec<Message>,
    }

    #[async_trait]
    impl Adapter for ScriptedAdapter {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn send(&self, _envelope: &Envelope, _strings: &[String]) -> AdapterResult<()> {
            Ok(())
        }

        async fn reply(&self, _envelope: &Envelope, _strings: &[String]) -> AdapterResult<()> {
            Ok(())
        }

        async fn run(
            &self,
            events: mpsc::Sender<Message>,
            shutdown: CancellationToken,
        ) -> AdapterResult<()> {
            for message in &self.script {
                if events.send(message.clone()).await.is_err() {
                    break;
                }
            }
            drop(events);
            shutdown.cancelled().await;
            Ok(())
        }
    }

    fn text(body: &str) -> Message {
        Message::text(Envelope::new(User::new("1", "alice"), "general"), body)
    }

    #[tokio::test]
    async fn test_runtime_pumps_adapter_events_into_robot() {
        let adapter = Arc::new(ScriptedAdapter {
            script: vec![text("one"), text("two")],
        });

        let mut runtime = Runtime::from_config(HeraldConfig::default(), adapter);
        let counter = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&counter);
        runtime.robot_mut().listen(
            |_| Ok(true),
            Default::default(),
            move |_| {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            },
        );

        // The scripted adapter drops its sender after the script, so the
        // loop drains both messages and exits on its own.
        runtime.run().await.unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_ready_hook_fires_on_run() {
        let adapter = Arc::new(ScriptedAdapter { script: Vec::new() });
        let mut runtime = Runtime::from_config(HeraldConfig::default(), adapter);

        let ready = Arc::new(AtomicUsize::new(0));
        let r = Arc::clone(&ready);
        runtime.robot_mut().on_ready(move || {
            r.fetch_add(1, Ordering::SeqCst);
        });

        runtime.run().await.unwrap();

        assert_eq!(ready.load(Ordering::SeqCst), 1);
    }
}
