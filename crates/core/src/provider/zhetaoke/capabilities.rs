use cashback_adapters::Platform;

use crate::provider::capabilities::{
    CredentialField, CredentialFieldType, PlatformCapability, ProviderCapabilities,
    ProviderFeature, SupplierCode,
};

pub const APPKEY: &str = "appkey";
pub const SID: &str = "sid";
pub const CUSTOMER_ID: &str = "customerId";

pub static ZHETAOKE_CAPABILITIES: ProviderCapabilities = ProviderCapabilities {
    code: SupplierCode::Zhetaoke,
    name: "折淘客",
    description: "专业的外卖/电商返利API服务商，支持美团、饿了么、抖音等平台",
    website: Some("https://www.zhetaoke.com"),
    credential_fields: &[
        CredentialField {
            key: APPKEY,
            label: "AppKey",
            placeholder: "请输入折淘客 AppKey",
            required: true,
            field_type: CredentialFieldType::Text,
            help_text: Some("在折淘客控制台 -> 我的应用 中获取"),
        },
        CredentialField {
            key: SID,
            label: "SID",
            placeholder: "请输入推广位 SID",
            required: true,
            field_type: CredentialFieldType::Text,
            help_text: Some("推广位ID，用于佣金结算"),
        },
        CredentialField {
            key: CUSTOMER_ID,
            label: "客户ID",
            placeholder: "可选，若账号要求可填写",
            required: false,
            field_type: CredentialFieldType::Text,
            help_text: Some("部分高级功能需要"),
        },
    ],
    platforms: &[
        PlatformCapability {
            platform: Platform::Meituan,
            features: &[
                ProviderFeature::ActivityList,
                ProviderFeature::ActivityDetail,
                ProviderFeature::Qrcode,
                ProviderFeature::Deeplink,
                ProviderFeature::MiniProgram,
            ],
            supported_link_types: &[1, 2, 3, 4, 5],
            notes: Some("美团外卖返利，支持H5/App/小程序多种链接类型"),
        },
        PlatformCapability {
            platform: Platform::Eleme,
            features: &[
                ProviderFeature::ActivityList,
                ProviderFeature::ActivityDetail,
                ProviderFeature::Qrcode,
            ],
            supported_link_types: &[1, 2],
            notes: Some("饿了么外卖返利，支持H5链接和二维码"),
        },
        PlatformCapability {
            platform: Platform::Douyin,
            features: &[
                ProviderFeature::ConvertLink,
                ProviderFeature::Qrcode,
                ProviderFeature::Deeplink,
            ],
            supported_link_types: &[1, 2],
            notes: Some("抖音本地生活返利"),
        },
    ],
};
