use crate::infra::InMemoryGateway;
use chrono::{Local, NaiveDate};
use clap::Args;
use realty_desk::backend::ViewPing;
use realty_desk::error::AppError;
use realty_desk::workflows::location::{InMemoryLocationStorage, LocationStore, SelectedLocation};
use realty_desk::workflows::map::{
    map_points, project_to_screen, Bounds, ContainerSize, LatLng, MapFeature, MapView,
    MapViewportSync, Pixel, PresentationMode, ViewportState, WebMercator, CARD_OFFSET,
};
use realty_desk::workflows::moderation::{
    required_field_set, ListingType, ModerationForm, ModerationRequest, ModerationService,
    ModerationServiceError, ModerationStatus, MoneyHolder, Notification, NotificationLevel,
    Notifier, OfferType, Property, PropertyId, PropertyStore, Role, SaleAgent, SaleAgentRole,
};
use realty_desk::workflows::mortgage::{self, MortgageRequest};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Date used for the deposit and contract fields (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print every update payload sent to the backend as JSON.
    #[arg(long)]
    pub(crate) show_payloads: bool,
    /// Skip the map portion of the demo.
    #[arg(long)]
    pub(crate) skip_map: bool,
}

/// Prints moderation toasts inline with the demo output.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let marker = match notification.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Error => "error",
        };
        println!(
            "  [{marker}] {} ({})",
            notification.message, notification.property_id
        );
    }
}

pub(crate) fn describe_required(status: ModerationStatus) -> String {
    let required = required_field_set(status);
    let mut blocks = Vec::new();
    if required.comment {
        blocks.push("comment");
    }
    if required.deposit {
        blocks.push("deposit");
    }
    if required.deal {
        blocks.push("deal");
    }

    if blocks.is_empty() {
        "no extra fields".to_string()
    } else {
        format!("requires {}", blocks.join(" + "))
    }
}

fn demo_listings() -> Vec<Property> {
    let located = |id: &str, status, listing_type, offer_type, title: &str, lat, lng| {
        let mut property = Property::new(id, status, listing_type, offer_type);
        property.title = title.to_string();
        property.latitude = Some(lat);
        property.longitude = Some(lng);
        property
    };

    vec![
        located(
            "prop-101",
            ModerationStatus::Approved,
            ListingType::Regular,
            OfferType::Sale,
            "3-room apartment, 7th microdistrict",
            42.8746,
            74.5698,
        ),
        located(
            "prop-202",
            ModerationStatus::Pending,
            ListingType::Vip,
            OfferType::Sale,
            "Penthouse with mountain view",
            42.8391,
            74.6105,
        ),
        located(
            "prop-303",
            ModerationStatus::Approved,
            ListingType::Regular,
            OfferType::Sale,
            "2-room flat near Osh bazaar",
            42.8748,
            74.5702,
        ),
    ]
}

fn sale_form(today: NaiveDate) -> ModerationForm {
    ModerationForm {
        comment: "Buyer signed after the second viewing".to_string(),
        buyer_full_name: "Aida Sadykova".to_string(),
        buyer_phone: "+996 555 010 203".to_string(),
        deposit_amount: Some(2000),
        deposit_currency: Some("USD".to_string()),
        deposit_received_at: Some(today),
        deposit_expires_at: None,
        money_holder: Some(MoneyHolder::Company),
        company_expected_income: Some(6000),
        planned_contract_signed_at: Some(today + chrono::Duration::days(14)),
        actual_sale_price: Some(118_000),
        company_commission_amount: Some(3500),
        sale_agents: vec![SaleAgent {
            agent_id: 3,
            role: SaleAgentRole::Main,
            commission_amount: Some(1200),
        }],
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        show_payloads,
        skip_map,
    } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let gateway = Arc::new(InMemoryGateway::with_listings(demo_listings()));
    let service = ModerationService::new(
        Arc::new(PropertyStore::new()),
        gateway.clone(),
        Arc::new(ConsoleNotifier),
    );
    let sale_id = PropertyId("prop-101".to_string());
    let vip_id = PropertyId("prop-202".to_string());

    println!("Realty desk demo");

    println!("\nModeration options for an administrator editing {sale_id}");
    let options = service.options(Role::Admin, &sale_id, true).await?;
    for option in &options.statuses {
        println!(
            "  - {:<14} {}",
            option.label,
            describe_required(option.status)
        );
    }
    println!("  selected: {}", options.selected.display_name());

    println!("\nMarking {sale_id} as sold without a comment");
    let incomplete = ModerationRequest {
        property_id: sale_id.clone(),
        role: Role::Admin,
        status: ModerationStatus::Sold,
        listing_type: None,
        form: ModerationForm::default(),
    };
    match service.submit(incomplete).await {
        Err(ModerationServiceError::Validation(err)) => {
            println!("  rejected before sending: {} ({:?})", err.message, err.field)
        }
        Err(err) => return Err(err.into()),
        Ok(_) => println!("  unexpectedly accepted"),
    }

    println!("\nMarking {sale_id} as sold with the full deal");
    let saved = service
        .submit(ModerationRequest {
            property_id: sale_id.clone(),
            role: Role::Admin,
            status: ModerationStatus::Sold,
            listing_type: Some(ListingType::Regular),
            form: sale_form(today),
        })
        .await?;
    println!(
        "  {} is now {} at {} (commission {})",
        saved.id,
        saved.moderation_status.display_name(),
        saved.actual_sale_price.unwrap_or_default(),
        saved.company_commission_amount.unwrap_or_default()
    );

    println!("\nAgent approving promoted listing {vip_id}");
    let vip_saved = service
        .submit(ModerationRequest {
            property_id: vip_id.clone(),
            role: Role::Agent,
            status: ModerationStatus::Approved,
            listing_type: None,
            form: ModerationForm::default(),
        })
        .await?;
    println!(
        "  sent as {} (promoted listings wait for an administrator)",
        vip_saved.moderation_status.display_name()
    );

    if show_payloads {
        println!("\nPayloads sent to the backend");
        for (id, payload) in gateway.payloads() {
            let body = serde_json::to_string_pretty(&payload).unwrap_or_default();
            println!("  {id}:\n{body}");
        }
    }

    let ping = ViewPing::spawn(gateway.clone(), sale_id.clone());
    ping.join().await;
    let similar = service.similar(&sale_id).await?;
    println!(
        "\nListing page for {sale_id}: {} view(s) recorded, {} similar listing(s)",
        gateway.views().len(),
        similar.len()
    );

    if !skip_map {
        run_map_demo(&gateway).await;
    }

    let quote = mortgage::quote(&MortgageRequest {
        price: 118_000,
        down_payment: 30_000,
        annual_rate_percent: 14.0,
        term_years: 15,
    })?;
    println!(
        "\nMortgage estimate: {:.2} per month over {} months ({:.2} interest)",
        quote.monthly_payment, quote.months, quote.total_interest
    );

    Ok(())
}

async fn run_map_demo(gateway: &InMemoryGateway) {
    println!("\nMap");

    let locations = LocationStore::new(Arc::new(InMemoryLocationStorage::new()));
    locations.select(SelectedLocation::city("Bishkek"));
    let filters = locations
        .current()
        .map(|location| location.filters())
        .unwrap_or_default();

    let listings = demo_listings();
    let points = map_points(&listings);
    let mut sync = MapViewportSync::with_filters(filters);
    println!(
        "  {} located listings -> {:?}",
        points.len(),
        sync.render_strategy(&points)
    );

    let bounds = Bounds {
        north: 42.95,
        south: 42.8,
        east: 74.7,
        west: 74.5,
    };

    let Some(ticket) = sync.update_viewport(ViewportState { bounds, zoom: 11 }) else {
        return;
    };
    sync.refresh(gateway, &ticket).await;

    let cluster = sync
        .visible_features()
        .into_iter()
        .find_map(|feature| match feature {
            MapFeature::Cluster(cluster) => Some(cluster.clone()),
            MapFeature::Point(_) => None,
        });
    let Some(cluster) = cluster else {
        println!("  no clusters in view");
        return;
    };
    let target = sync.click_cluster(&cluster);
    println!(
        "  zoom 11: cluster of {} -> zooming to {}",
        cluster.point_count, target.zoom
    );

    let Some(ticket) = sync.update_viewport(ViewportState {
        bounds,
        zoom: target.zoom,
    }) else {
        return;
    };
    sync.refresh(gateway, &ticket).await;
    println!(
        "  zoom {}: {} point(s) visible",
        target.zoom,
        sync.visible_features().len()
    );

    let point = sync
        .visible_features()
        .into_iter()
        .find_map(|feature| match feature {
            MapFeature::Point(point) => Some(point.clone()),
            MapFeature::Cluster(_) => None,
        });
    let Some(point) = point else {
        return;
    };
    sync.click_point(&point);
    if let Some(details) = sync.load_selected(gateway).await {
        println!("  selected: {}", details.title);
    }

    let map = MapView::new(
        Arc::new(WebMercator),
        target.center,
        f64::from(target.zoom),
        ContainerSize {
            width: 1280.0,
            height: 720.0,
        },
        Pixel { x: 0.0, y: 64.0 },
    );
    for width in [1280, 390] {
        let mode = PresentationMode::for_viewport_width(width);
        match (mode, sync.anchor(Some(&map))) {
            (PresentationMode::AnchoredCard, Some(position)) => println!(
                "  {width}px: card at ({:.0}, {:.0})",
                position.left, position.top
            ),
            (PresentationMode::AnchoredCard, None) => println!("  {width}px: card hidden"),
            (PresentationMode::BottomSheet, _) => println!("  {width}px: bottom sheet"),
        }
    }

    let unknown = LatLng::new(f64::NAN, 0.0);
    println!(
        "  unprojectable coordinate hides the card: {}",
        project_to_screen(Some(&map), Some(unknown), CARD_OFFSET).is_none()
    );
}
