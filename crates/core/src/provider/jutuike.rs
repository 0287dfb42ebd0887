//! Jutuike supplier.
//!
//! Only the capability table exists so the supplier can be listed and its
//! credentials collected. There is no provider implementation and no
//! factory, so configurations for it are skipped at service construction.

use super::capabilities::{
    CredentialField, CredentialFieldType, ProviderCapabilities, SupplierCode,
};

pub static JUTUIKE_CAPABILITIES: ProviderCapabilities = ProviderCapabilities {
    code: SupplierCode::Jutuike,
    name: "聚推客",
    description: "聚推客返利API服务商（即将支持）",
    website: Some("https://www.jutuike.com"),
    credential_fields: &[
        CredentialField {
            key: "apiKey",
            label: "API Key",
            placeholder: "请输入聚推客 API Key",
            required: true,
            field_type: CredentialFieldType::Text,
            help_text: Some("在聚推客控制台获取"),
        },
        CredentialField {
            key: "secretKey",
            label: "Secret Key",
            placeholder: "请输入 Secret Key",
            required: true,
            field_type: CredentialFieldType::Password,
            help_text: Some("用于接口签名"),
        },
        CredentialField {
            key: "channelId",
            label: "渠道ID",
            placeholder: "请输入渠道ID",
            required: true,
            field_type: CredentialFieldType::Text,
            help_text: Some("推广渠道标识"),
        },
    ],
    platforms: &[],
};
