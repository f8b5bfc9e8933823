use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::chain::CoreMetadata;

/// JSON body behind an NFT token URI. `name` and `image` are required;
/// anything else the creator put there is tolerated and ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftTokenMetadata {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub description: String,
}

/// One `{ key, value }` attribute from the IP metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

/// JSON body behind an IP metadata URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpMetadata {
    pub title: String,
    pub description: String,
    pub attributes: Vec<Attribute>,
}

/// A registered IP asset: on-chain core metadata joined with the two
/// off-chain documents it references. `token_id` and `token_contract` are
/// known only when the asset was reached through collection enumeration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpAsset {
    pub id: Address,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub title: String,
    pub attributes: Vec<Attribute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_contract: Option<Address>,
    /// Unix timestamp of on-chain registration.
    pub registration_date: u64,
    pub owner: Address,
    pub nft_token_uri: String,
    pub metadata_uri: String,
}

impl IpAsset {
    pub fn from_parts(
        id: Address,
        core: CoreMetadata,
        token: NftTokenMetadata,
        ip: IpMetadata,
    ) -> Self {
        Self {
            id,
            name: token.name,
            description: token.description,
            image_url: token.image,
            title: ip.title,
            attributes: ip.attributes,
            token_id: None,
            token_contract: None,
            registration_date: core.registration_date,
            owner: core.owner,
            nft_token_uri: core.nft_token_uri,
            metadata_uri: core.metadata_uri,
        }
    }
}
