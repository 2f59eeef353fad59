use url::form_urlencoded;

/// 携带完整上游路径和查询的参数名
pub const TARGET_PARAM: &str = "target";

/// 角色 ID 参数名
pub const ACTOR_PARAM: &str = "actor";

/// 由网关强制设置的上游参数
pub const DATASOURCE_PARAM: &str = "datasource";

/// 规范化后的上游路径与透传查询参数
///
/// 两种调用形式得到同样的结果：`?target=<编码后的路径和查询>` 与直接拼在网关路径后的字面路径。
/// 透传参数不包含角色 ID、`target` 和调用方自带的 `datasource`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EsiTarget {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl EsiTarget {
    /// `?target=...` 形式，`params` 是网关收到的全部查询参数
    pub fn from_encoded(target: &str, params: &[(String, String)]) -> Self {
        let (path, embedded) = target.split_once('?').unwrap_or((target, ""));

        let mut query: Vec<(String, String)> = form_urlencoded::parse(embedded.as_bytes())
            .into_owned()
            .collect();
        query.extend(
            params
                .iter()
                .filter(|(name, _)| name != TARGET_PARAM)
                .cloned(),
        );

        Self::new(path, query)
    }

    /// 字面路径形式
    pub fn from_literal(path: &str, params: &[(String, String)]) -> Self {
        Self::new(path, params.to_vec())
    }

    fn new(path: &str, query: Vec<(String, String)>) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default().trim();
        let path = if path.is_empty() || path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        let query = query
            .into_iter()
            .filter(|(name, _)| name != ACTOR_PARAM && name != DATASOURCE_PARAM)
            .collect();

        Self { path, query }
    }

    pub fn is_empty(&self) -> bool {
        self.path.trim_matches('/').is_empty()
    }

    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }

        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{}", self.path, query)
    }
}
