use amplify_server::campaign::PackageTier;
use amplify_server::{CampaignBody, CreateCampaignBody};
use awc::Client;

// needs a local mongod on the default port
#[actix_rt::test]
#[ignore]
async fn create_campaign() {
    let _ = std::thread::spawn(|| amplify_server::run(false));
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;

    let body = CreateCampaignBody {
        brand_name: "The Green Bean Brigade".into(),
        description: "Cold brew for people who hate cold brew".into(),
        target_audience: "coffee skeptics".into(),
        package: PackageTier::Starter,
        budget: 50000,
        duration_hours: 24,
        estimated_participants: 10,
        estimated_reach: 20000,
    };
    let client = Client::default();
    let campaign: CampaignBody = client
        .post("http://localhost:8080/campaigns")
        .send_json(&body)
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(campaign.brand_name, "The Green Bean Brigade".to_string());
    assert_eq!(campaign.budget, 50000);
}
