use std::collections::HashMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::routing::{RoutingError, DEFAULT_PATH_TEMPLATE};

/// 노드 식별자 속성 키
pub const NODE_ID_PROPERTY: &str = "datawire_nodeId";
/// 노드 식별자 보조 키
pub const NODE_ID_FALLBACK_PROPERTY: &str = "nodeId";
/// 공개 여부 속성 키
pub const PUBLIC_PROPERTY: &str = "MDK_GATEWAY_PUBLIC_SERVICE";
/// 경로 템플릿 속성 키
pub const PATH_PREFIX_PROPERTY: &str = "MDK_GATEWAY_PATH_PREFIX";

/// 디스커버리에 등록된 서비스 인스턴스 하나입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub service: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, deserialize_with = "deserialize_properties")]
    pub properties: Option<HashMap<String, String>>,
}

impl Node {
    pub fn new(service: impl Into<String>, version: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
            address: address.into(),
            properties: None,
        }
    }

    /// 속성을 하나 추가합니다.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// `properties`가 없으면 빈 맵으로 채웁니다.
    pub fn normalize(mut self) -> Self {
        if self.properties.is_none() {
            self.properties = Some(HashMap::new());
        }
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|props| props.get(key))
            .map(String::as_str)
    }

    /// 백엔드 서버 항목의 키가 되는 노드 식별자
    pub fn node_id(&self) -> Result<&str, RoutingError> {
        self.property(NODE_ID_PROPERTY)
            .or_else(|| self.property(NODE_ID_FALLBACK_PROPERTY))
            .filter(|id| !id.is_empty())
            .ok_or_else(|| RoutingError::MissingIdentity {
                service: self.service.clone(),
                version: self.version.clone(),
            })
    }

    /// 공개 여부. 속성이 없으면 공개로 취급합니다.
    pub fn is_public(&self) -> bool {
        match self.property(PUBLIC_PROPERTY) {
            Some(flag) => !matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "false" | "0" | "no" | "off"
            ),
            None => true,
        }
    }

    pub fn path_template(&self) -> &str {
        self.property(PATH_PREFIX_PROPERTY).unwrap_or(DEFAULT_PATH_TEMPLATE)
    }
}

// 문자열이 아닌 값(bool, 숫자)도 문자열로 받아들이고 null은 버림
fn deserialize_properties<'de, D>(deserializer: D) -> Result<Option<HashMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<HashMap<String, Value>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|props| {
        props
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect()
    }))
}

/// 디스커버리 피드가 전달하는 노드 생명주기 이벤트입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DiscoveryEvent {
    /// 노드 활성화
    NodeActive { node: Node },
    /// 노드 만료
    NodeExpired { node: Node },
    /// 알 수 없는 이벤트 (무시)
    #[serde(other)]
    Unknown,
}

/// TCP 피드 연결 직후 보내는 구독 요청
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum FeedRequest<'a> {
    Subscribe {
        #[serde(skip_serializing_if = "Option::is_none")]
        token: Option<&'a str>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_flag_parsing() {
        let node = Node::new("svc", "1.0.0", "http://127.0.0.1:1");
        assert!(node.is_public());
        assert!(!node.clone().with_property(PUBLIC_PROPERTY, "False").is_public());
        assert!(!node.clone().with_property(PUBLIC_PROPERTY, "0").is_public());
        assert!(node.with_property(PUBLIC_PROPERTY, "true").is_public());
    }

    #[test]
    fn test_node_id_fallback() {
        let node = Node::new("svc", "1", "addr").with_property(NODE_ID_FALLBACK_PROPERTY, "n1");
        assert_eq!(node.node_id(), Ok("n1"));

        let node = Node::new("svc", "1", "addr");
        assert!(matches!(node.node_id(), Err(RoutingError::MissingIdentity { .. })));
    }

    #[test]
    fn test_properties_accept_non_string_values() {
        let node: Node = serde_json::from_str(
            r#"{"service":"svc","version":"1","address":"a",
                "properties":{"MDK_GATEWAY_PUBLIC_SERVICE":false,"datawire_nodeId":"n1","x":null}}"#,
        ).unwrap();
        assert_eq!(node.property(PUBLIC_PROPERTY), Some("false"));
        assert_eq!(node.property("x"), None);
        assert!(!node.is_public());
    }
}
