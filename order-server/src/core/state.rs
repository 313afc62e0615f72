//! Server state

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{RemoteTokenVerifier, TokenVerifier};
use crate::core::Config;
use crate::notify::{HttpPushGateway, NoopPushGateway, NotificationService, PushGateway};
use crate::orders::OrderService;
use crate::services::CatalogService;
use crate::store::{DocumentStore, MemoryStore};

/// 服务器状态 - 持有所有服务的单例引用
///
/// 所有字段为 `Arc` 共享，Clone 成本极低。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | store | 文档存储 (外部协作者边界) |
/// | push | 推送网关 (外部协作者边界) |
/// | verifier | 身份校验 (外部协作者边界) |
/// | catalog | 分类缓存服务 |
/// | notifier | 通知服务 |
/// | orders | 订单提交服务 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
    pub push: Arc<dyn PushGateway>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub catalog: Arc<CatalogService>,
    pub notifier: NotificationService,
    pub orders: OrderService,
}

impl ServerState {
    /// Wire the bundled collaborator implementations: the embedded document
    /// store, the HTTP push gateway (or the no-op fallback when unset) and
    /// the remote token verifier.
    pub fn initialize(config: &Config) -> Self {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());

        let push: Arc<dyn PushGateway> = match &config.push_gateway_url {
            Some(url) => Arc::new(HttpPushGateway::new(url, &config.push_server_key)),
            None => {
                tracing::warn!("PUSH_GATEWAY_URL not set, push delivery disabled");
                Arc::new(NoopPushGateway)
            }
        };

        let verifier: Arc<dyn TokenVerifier> =
            Arc::new(RemoteTokenVerifier::new(&config.auth_verify_url));

        Self::with_components(config.clone(), store, push, verifier)
    }

    /// Build the service graph over explicit collaborators. Used by
    /// [`initialize`](Self::initialize) and by tests that inject stubs.
    pub fn with_components(
        config: Config,
        store: Arc<dyn DocumentStore>,
        push: Arc<dyn PushGateway>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        let catalog = Arc::new(CatalogService::new(
            store.clone(),
            Duration::from_secs(config.category_cache_ttl_secs),
        ));
        let notifier =
            NotificationService::new(store.clone(), push.clone(), config.admin_fanout_limit);
        let orders = OrderService::new(store.clone(), notifier.clone());

        Self {
            config,
            store,
            push,
            verifier,
            catalog,
            notifier,
            orders,
        }
    }
}
