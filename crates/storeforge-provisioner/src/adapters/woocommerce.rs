//! WordPress + WooCommerce adapter
//!
//! Deploys the Bitnami WordPress chart with MariaDB and drives wp-cli inside
//! the WordPress pod to install WooCommerce, seed a product and enable
//! cash-on-delivery. Every wp-cli step checks before it changes anything, so
//! configuration can be repeated on the same release.

use super::{AdapterError, ChartDependency, ConfigureOutcome, PlatformAdapter};
use crate::command::{args, CommandError, CommandRunner};
use async_trait::async_trait;
use base64::Engine as _;
use std::sync::Arc;
use storeforge_types::StoreEngine;
use tracing::{debug, instrument, warn};

const WORDPRESS_ROOT: &str = "/opt/bitnami/wordpress";

const CORE_INSTALLED: &str = "wp core is-installed --allow-root";

const INSTALL_WOOCOMMERCE: &str = "\
(wp plugin is-installed woocommerce --allow-root || wp plugin install woocommerce --activate --allow-root) && \
(wp plugin is-active woocommerce --allow-root || wp plugin activate woocommerce --allow-root) && \
wp eval 'if (class_exists(\"WC_Install\")) { WC_Install::create_pages(); }' --allow-root";

const ENSURE_SAMPLE_PRODUCT: &str = "\
PRODUCT_IDS=$(wp post list --post_type=product --post_status=publish --format=ids --allow-root 2>/dev/null || true); \
if [ -z \"$PRODUCT_IDS\" ]; then \
PRODUCT_ID=$(wp post create --post_type=product --post_status=publish --post_title='Sample Product' --porcelain --allow-root); \
wp post meta set $PRODUCT_ID _regular_price '9.99' --allow-root; \
wp post meta set $PRODUCT_ID _price '9.99' --allow-root; \
wp post meta set $PRODUCT_ID _stock_status 'instock' --allow-root; \
wp term set product_type $PRODUCT_ID simple --allow-root || true; \
fi";

const ENABLE_COD: &str = "\
wp option update woocommerce_enable_cod yes --allow-root && \
wp option update woocommerce_cod_settings '{\"enabled\":\"yes\"}' --allow-root";

/// Adapter for WooCommerce stores
pub struct WooCommerceAdapter {
    runner: Arc<dyn CommandRunner>,
    kubectl_bin: String,
}

impl WooCommerceAdapter {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            kubectl_bin: "kubectl".to_string(),
        }
    }

    pub fn with_kubectl_bin(mut self, kubectl_bin: impl Into<String>) -> Self {
        self.kubectl_bin = kubectl_bin.into();
        self
    }

    fn selector(release: &str) -> String {
        format!(
            "app.kubernetes.io/name=wordpress,app.kubernetes.io/instance={}",
            release
        )
    }

    async fn kubectl(&self, cmd: Vec<String>) -> Result<String, CommandError> {
        self.runner.run(&self.kubectl_bin, &cmd).await
    }

    async fn wordpress_pod(&self, namespace: &str, release: &str) -> Option<String> {
        let selector = Self::selector(release);
        let cmd = args([
            "get",
            "pods",
            "-n",
            namespace,
            "-l",
            selector.as_str(),
            "-o",
            "jsonpath={.items[0].metadata.name}",
        ]);

        match self.kubectl(cmd).await {
            Ok(out) => Some(out.trim().to_string()).filter(|name| !name.is_empty()),
            Err(e) => {
                debug!(error = %e, "WordPress pod lookup failed");
                None
            }
        }
    }

    /// Run a wp-cli script inside the WordPress root of `pod`
    async fn wp(&self, namespace: &str, pod: &str, script: &str) -> Result<String, CommandError> {
        let script = format!("cd {} && {}", WORDPRESS_ROOT, script);
        let cmd = args(["exec", "-n", namespace, pod, "--", "bash", "-c", script.as_str()]);
        self.kubectl(cmd).await
    }

    async fn core_installed(&self, namespace: &str, pod: &str) -> bool {
        self.wp(namespace, pod, CORE_INSTALLED).await.is_ok()
    }
}

#[async_trait]
impl PlatformAdapter for WooCommerceAdapter {
    fn engine(&self) -> StoreEngine {
        StoreEngine::WooCommerce
    }

    fn chart_dependency(&self) -> Option<ChartDependency> {
        Some(ChartDependency {
            name: "wordpress".to_string(),
            version: "28.x.x".to_string(),
            repository: "https://charts.bitnami.com/bitnami".to_string(),
            condition: "wordpress.enabled".to_string(),
        })
    }

    fn default_values(
        &self,
        store_name: &str,
        host: &str,
    ) -> Result<serde_json::Value, AdapterError> {
        Ok(serde_json::json!({
            "store": {
                "name": store_name,
                "engine": "wordpress",
                "host": host,
            },
            "wordpress": {
                "enabled": true,
                "wordpressUsername": "user",
                "wordpressEmail": "admin@example.com",
                "wordpressBlogName": store_name,
                "wordpressPlugins": "woocommerce",
                "mariadb": {
                    "enabled": true,
                    "auth": {
                        "database": "wordpress",
                        "username": "bn_wordpress",
                    },
                    "primary": {
                        "persistence": { "size": "8Gi" },
                    },
                },
            },
            "ingress": {
                "enabled": true,
                "className": "nginx",
            },
        }))
    }

    #[instrument(skip(self))]
    async fn configure(&self, namespace: &str, release: &str) -> ConfigureOutcome {
        let Some(pod) = self.wordpress_pod(namespace, release).await else {
            return ConfigureOutcome::Failed("WordPress pod not found".to_string());
        };

        if !self.core_installed(namespace, &pod).await {
            return ConfigureOutcome::NotReady("WordPress core not installed".to_string());
        }

        let steps = [
            (INSTALL_WOOCOMMERCE, "Failed to install/activate WooCommerce"),
            (ENSURE_SAMPLE_PRODUCT, "Failed to create test product"),
            (ENABLE_COD, "Failed to enable COD payment"),
        ];

        for (script, failure) in steps {
            if let Err(e) = self.wp(namespace, &pod, script).await {
                warn!(pod = %pod, error = %e, "{}", failure);
                return ConfigureOutcome::Failed(failure.to_string());
            }
        }

        ConfigureOutcome::Configured
    }

    async fn admin_password(&self, namespace: &str, release: &str) -> Option<String> {
        let secret = format!("{}-wordpress", release);
        let cmd = args([
            "get",
            "secret",
            "-n",
            namespace,
            secret.as_str(),
            "-o",
            "jsonpath={.data.wordpress-password}",
        ]);

        let encoded = match self.kubectl(cmd).await {
            Ok(out) => out.trim().to_string(),
            Err(e) => {
                debug!(error = %e, "Admin secret lookup failed");
                return None;
            }
        };

        if encoded.is_empty() {
            return None;
        }

        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
    }

    fn pod_selector(&self, release: &str) -> Result<String, AdapterError> {
        Ok(Self::selector(release))
    }

    fn store_url_path(&self) -> &'static str {
        "/shop/"
    }

    async fn is_platform_ready(&self, namespace: &str, release: &str) -> bool {
        match self.wordpress_pod(namespace, release).await {
            Some(pod) => self.core_installed(namespace, &pod).await,
            None => false,
        }
    }
}
