use std::future::Future;
use std::time::Duration;

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::services::catalog::connect_backend;
use crate::services::lifecycle::{LifecycleHook, RegistrationLifecycle};
use crate::services::registry::Registrar;

pub async fn start(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    // 初始化目录后端
    let backend = connect_backend(&config.catalog)?;

    let registrar = Registrar::new(backend);
    let lifecycle = RegistrationLifecycle::from_config(&config, registrar);

    // 注册前先装好信号处理，装不上就不注册
    let shutdown = ShutdownSignal::install()?;

    // 健康检查地址由宿主应用提供，这里不监听
    println!(
        "Service {} ({}) starting, catalog at {}, health check expected at {}",
        config.service.name,
        config.service.id,
        config.catalog.address,
        lifecycle.identity().health_check_url()
    );

    run(&lifecycle, config.lifecycle_timeout(), shutdown.wait()).await;

    Ok(())
}

/// 执行启动钩子，等待关闭信号，再执行停止钩子
pub async fn run<H, S>(hook: &H, deadline: Duration, shutdown: S)
where
    H: LifecycleHook + ?Sized,
    S: Future<Output = ()>,
{
    let (cancel, timer) = deadline_token(deadline);
    let outcome = hook.on_start(&cancel).await;
    timer.abort();
    if let Some(e) = outcome.error() {
        tracing::warn!(error = %e, "Continuing startup without catalog registration");
    }

    shutdown.await;
    tracing::info!("Shutdown signal received");

    let (cancel, timer) = deadline_token(deadline);
    let outcome = hook.on_stop(&cancel).await;
    timer.abort();
    if let Some(e) = outcome.error() {
        tracing::warn!(error = %e, "Stopping without catalog deregistration");
    }
}

// 超过截止时间后取消令牌
fn deadline_token(deadline: Duration) -> (CancellationToken, tokio::task::JoinHandle<()>) {
    let cancel = CancellationToken::new();
    let guard = cancel.clone();
    let timer = tokio::spawn(async move {
        tokio::time::sleep(deadline).await;
        tracing::warn!(deadline_secs = deadline.as_secs(), "Lifecycle hook deadline exceeded");
        guard.cancel();
    });
    (cancel, timer)
}

/// 关闭信号：Ctrl-C 或 SIGTERM
///
/// 监听在 [`ShutdownSignal::install`] 时立即注册，之后到达的信号不会走默认处理。
pub struct ShutdownSignal {
    #[cfg(unix)]
    interrupt: Signal,
    #[cfg(unix)]
    terminate: Signal,
}

impl ShutdownSignal {
    pub fn install() -> std::io::Result<Self> {
        #[cfg(unix)]
        {
            let interrupt = signal(SignalKind::interrupt()).inspect_err(|e| {
                tracing::error!(error = %e, "Failed to install SIGINT handler");
            })?;
            let terminate = signal(SignalKind::terminate()).inspect_err(|e| {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
            })?;
            Ok(Self {
                interrupt,
                terminate,
            })
        }

        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    /// 等待任一关闭信号
    #[cfg(unix)]
    pub async fn wait(mut self) {
        tokio::select! {
            _ = self.interrupt.recv() => tracing::info!("Received Ctrl+C signal"),
            _ = self.terminate.recv() => tracing::info!("Received SIGTERM signal"),
        }
    }

    #[cfg(not(unix))]
    pub async fn wait(self) {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C signal"),
            Err(e) => {
                // 监听失败时不能当作收到信号，否则刚注册就会注销
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
    }
}
