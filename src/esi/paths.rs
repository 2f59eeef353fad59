//! 静态路由表：公开路径列表与按路由组划分的限流表。
//!
//! 两张表在启动时构建一次，之后只读。匹配前会去掉路径开头的版本段
//! （`/v3`、`/latest` 等），模板中的 `{name}` 匹配任意一个路径段，
//! 末尾的 `*` 匹配剩余的任意段。

use std::cmp::Reverse;

use axum::http::Method;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param,
    Rest,
}

/// 路径模板
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn new(pattern: &str) -> Self {
        let segments = split_segments(pattern)
            .map(|s| {
                if s == "*" {
                    Segment::Rest
                } else if s.starts_with('{') && s.ends_with('}') {
                    Segment::Param
                } else {
                    Segment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// 路径是否匹配该模板，路径可以带版本前缀
    pub fn matches(&self, path: &str) -> bool {
        let path = strip_version(path);
        let mut parts = split_segments(path);

        for segment in &self.segments {
            match segment {
                Segment::Rest => return true,
                Segment::Param => {
                    if parts.next().is_none() {
                        return false;
                    }
                }
                Segment::Literal(literal) => match parts.next() {
                    Some(part) if part == literal => {}
                    _ => return false,
                },
            }
        }

        parts.next().is_none()
    }

    /// 排序用的具体程度：字面段越多越具体，不含通配符的优先
    fn specificity(&self) -> (usize, bool, usize) {
        let literals = self
            .segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count();
        let exact = !self.segments.contains(&Segment::Rest);
        (literals, exact, self.segments.len())
    }
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// 去掉 `/v1`、`/latest`、`/legacy`、`/dev` 这样的版本前缀
pub fn strip_version(path: &str) -> &str {
    let trimmed = path.trim_start_matches('/');
    let (first, rest) = match trimmed.find('/') {
        Some(idx) => (&trimmed[..idx], &trimmed[idx..]),
        None => (trimmed, ""),
    };

    let is_version = matches!(first, "latest" | "legacy" | "dev")
        || (first.len() > 1
            && first.starts_with('v')
            && first[1..].chars().all(|c| c.is_ascii_digit()));

    if is_version { rest } else { path }
}

/// 无需角色令牌的公开上游路由
#[derive(Debug, Clone)]
pub struct PublicPaths {
    patterns: Vec<PathPattern>,
}

impl PublicPaths {
    pub fn new<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            patterns: patterns.into_iter().map(PathPattern::new).collect(),
        }
    }

    /// 返回第一个匹配的公开路由模板
    pub fn find(&self, path: &str) -> Option<&PathPattern> {
        self.patterns.iter().find(|p| p.matches(path))
    }
}

impl Default for PublicPaths {
    fn default() -> Self {
        Self::new(PUBLIC_ROUTES.iter().copied())
    }
}

const PUBLIC_ROUTES: &[&str] = &[
    "/alliances/",
    "/alliances/{alliance_id}/",
    "/alliances/{alliance_id}/corporations/",
    "/alliances/{alliance_id}/icons/",
    "/characters/affiliation/",
    "/characters/{character_id}/",
    "/characters/{character_id}/corporationhistory/",
    "/characters/{character_id}/portrait/",
    "/contracts/public/*",
    "/corporations/npccorps/",
    "/corporations/{corporation_id}/",
    "/corporations/{corporation_id}/alliancehistory/",
    "/corporations/{corporation_id}/icons/",
    "/dogma/*",
    "/fw/*",
    "/incursions/",
    "/industry/facilities/",
    "/industry/systems/",
    "/insurance/prices/",
    "/killmails/{killmail_id}/{killmail_hash}/",
    "/loyalty/stores/{corporation_id}/offers/",
    "/markets/groups/*",
    "/markets/prices/",
    "/markets/{region_id}/history/",
    "/markets/{region_id}/orders/",
    "/markets/{region_id}/types/",
    "/opportunities/*",
    "/route/{origin}/{destination}/",
    "/sovereignty/*",
    "/status/",
    "/universe/*",
    "/wars/*",
];

/// 限流表中的一条记录
#[derive(Debug, Clone)]
pub struct RouteRateLimit {
    pub pattern: PathPattern,
    pub method: Method,
    pub group: String,
    pub max_tokens: u32,
    pub window_secs: u64,
}

impl RouteRateLimit {
    pub fn new(method: Method, pattern: &str, group: &str, max_tokens: u32, window_secs: u64) -> Self {
        Self {
            pattern: PathPattern::new(pattern),
            method,
            group: group.to_string(),
            max_tokens,
            window_secs,
        }
    }

    /// 与上游 `X-Ratelimit-Limit` 相同格式的限额描述，如 `1800/15m`
    pub fn limit_spec(&self) -> String {
        let window = match self.window_secs {
            s if s > 0 && s % 3600 == 0 => format!("{}h", s / 3600),
            s if s > 0 && s % 60 == 0 => format!("{}m", s / 60),
            s => format!("{}s", s),
        };
        format!("{}/{}", self.max_tokens, window)
    }
}

/// 路由组限流表
///
/// 构造时按具体程度从高到低稳定排序，查找时第一个匹配者胜出，
/// 因此 `/characters/{id}/assets/` 总是先于 `/characters/{id}/*` 被命中。
#[derive(Debug, Clone)]
pub struct RateLimitRoutes {
    entries: Vec<RouteRateLimit>,
}

impl RateLimitRoutes {
    pub fn new(mut entries: Vec<RouteRateLimit>) -> Self {
        entries.sort_by_key(|e| Reverse(e.pattern.specificity()));
        Self { entries }
    }

    pub fn find(&self, method: &Method, path: &str) -> Option<&RouteRateLimit> {
        self.entries
            .iter()
            .find(|e| e.method == *method && e.pattern.matches(path))
    }

    /// 表中出现的所有路由组，按首次出现顺序去重
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !groups.contains(&entry.group.as_str()) {
                groups.push(&entry.group);
            }
        }
        groups
    }
}

impl Default for RateLimitRoutes {
    fn default() -> Self {
        const MIN_15: u64 = 15 * 60;

        Self::new(vec![
            RouteRateLimit::new(Method::GET, "/characters/{character_id}/assets/", "char-asset", 1800, MIN_15),
            RouteRateLimit::new(Method::POST, "/characters/{character_id}/assets/locations/", "char-asset", 1800, MIN_15),
            RouteRateLimit::new(Method::POST, "/characters/{character_id}/assets/names/", "char-asset", 1800, MIN_15),
            RouteRateLimit::new(Method::GET, "/characters/{character_id}/wallet/", "char-wallet", 150, MIN_15),
            RouteRateLimit::new(Method::GET, "/characters/{character_id}/wallet/journal/", "char-wallet", 150, MIN_15),
            RouteRateLimit::new(Method::GET, "/characters/{character_id}/wallet/transactions/", "char-wallet", 150, MIN_15),
            RouteRateLimit::new(Method::GET, "/characters/{character_id}/location/", "char-location", 1200, MIN_15),
            RouteRateLimit::new(Method::GET, "/characters/{character_id}/online/", "char-location", 1200, MIN_15),
            RouteRateLimit::new(Method::GET, "/characters/{character_id}/ship/", "char-location", 1200, MIN_15),
            RouteRateLimit::new(Method::GET, "/characters/{character_id}/notifications/", "char-notification", 15, MIN_15),
            RouteRateLimit::new(Method::GET, "/characters/{character_id}/mail/", "char-social", 600, MIN_15),
            RouteRateLimit::new(Method::GET, "/characters/{character_id}/industry/jobs/", "char-industry", 600, MIN_15),
            RouteRateLimit::new(Method::GET, "/characters/{character_id}/killmails/recent/", "char-killmail", 30, MIN_15),
            RouteRateLimit::new(Method::GET, "/characters/{character_id}/*", "char-detail", 600, MIN_15),
            RouteRateLimit::new(Method::GET, "/corporations/{corporation_id}/members/", "corp-member", 300, MIN_15),
            RouteRateLimit::new(Method::GET, "/corporations/{corporation_id}/membertracking/", "corp-member", 300, MIN_15),
            RouteRateLimit::new(Method::GET, "/corporations/{corporation_id}/assets/", "corp-asset", 1800, MIN_15),
            RouteRateLimit::new(Method::GET, "/corporations/{corporation_id}/wallets/{division}/journal/", "corp-wallet", 300, MIN_15),
            RouteRateLimit::new(Method::GET, "/corporations/{corporation_id}/*", "corp-detail", 300, MIN_15),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_version_prefix() {
        assert_eq!(strip_version("/v3/characters/1/assets/"), "/characters/1/assets/");
        assert_eq!(strip_version("/latest/status/"), "/status/");
        assert_eq!(strip_version("/characters/1/"), "/characters/1/");
        assert_eq!(strip_version("/verify/"), "/verify/");
    }

    #[test]
    fn public_paths_match_whole_path() {
        let public = PublicPaths::default();

        assert!(public.find("/alliances/").is_some());
        assert!(public.find("/v1/alliances/99000006/").is_some());
        assert!(public.find("/latest/universe/types/587/").is_some());
        assert!(public.find("/v5/characters/96061222/").is_some());
        assert!(public.find("/v3/characters/96061222/assets/").is_none());
        assert!(public.find("/v1/characters/96061222/mail/").is_none());
    }

    #[test]
    fn trailing_slash_is_optional() {
        let pattern = PathPattern::new("/alliances/{alliance_id}/");
        assert!(pattern.matches("/alliances/1"));
        assert!(pattern.matches("/alliances/1/"));
        assert!(!pattern.matches("/alliances/"));
    }

    #[test]
    fn most_specific_route_wins_regardless_of_declaration_order() {
        let routes = RateLimitRoutes::new(vec![
            RouteRateLimit::new(Method::GET, "/characters/{character_id}/*", "char-detail", 600, 900),
            RouteRateLimit::new(Method::GET, "/characters/{character_id}/assets/", "char-asset", 1800, 900),
        ]);

        let hit = routes.find(&Method::GET, "/v3/characters/1/assets/").unwrap();
        assert_eq!(hit.group, "char-asset");

        let fallback = routes.find(&Method::GET, "/v2/characters/1/skills/").unwrap();
        assert_eq!(fallback.group, "char-detail");

        assert!(routes.find(&Method::POST, "/v3/characters/1/assets/").is_none());
    }

    #[test]
    fn limit_spec_formats_window() {
        let route = RouteRateLimit::new(Method::GET, "/x/", "g", 1800, 900);
        assert_eq!(route.limit_spec(), "1800/15m");

        let hourly = RouteRateLimit::new(Method::GET, "/x/", "g", 10, 3600);
        assert_eq!(hourly.limit_spec(), "10/1h");
    }

    #[test]
    fn default_groups_are_unique() {
        let routes = RateLimitRoutes::default();
        let groups = routes.groups();
        assert!(groups.contains(&"char-asset"));
        assert_eq!(
            groups.iter().filter(|g| **g == "char-asset").count(),
            1
        );
    }
}
