use super::errors::ResourceError;

/// Accounts hosting the BlazingText algorithm image, per region.
const REGISTRY_ACCOUNTS: &[(&str, &str)] = &[
    ("us-east-1", "811284229777"),
    ("us-east-2", "825641698319"),
    ("us-west-2", "433757028032"),
    ("eu-west-1", "685385470294"),
    ("eu-central-1", "813361260812"),
    ("ap-northeast-1", "501404015308"),
    ("ap-northeast-2", "306986355934"),
    ("ap-southeast-2", "544295431143"),
    ("ap-southeast-1", "475088953585"),
    ("ap-south-1", "991648021394"),
    ("ca-central-1", "469771592824"),
    ("eu-west-2", "644912444149"),
    ("us-west-1", "632365934929"),
];

const ALGORITHM_IMAGE: &str = "blazingtext:latest";

pub fn registry_account(region: &str) -> Result<&'static str, ResourceError> {
    REGISTRY_ACCOUNTS
        .iter()
        .find(|(code, _)| *code == region)
        .map(|(_, account)| *account)
        .ok_or_else(|| ResourceError::UnsupportedRegion(region.to_owned()))
}

pub fn training_image(region: &str) -> Result<String, ResourceError> {
    let account = registry_account(region)?;
    Ok(format!("{account}.dkr.ecr.{region}.amazonaws.com/{ALGORITHM_IMAGE}"))
}
