use std::{collections::HashSet, sync::Arc};

use crate::{Services, ServicesContainer, SessionStore};

use delivery_bot::{
    fulfilment::{DeliveryRegistry, Resolution, RouteTracker, UserDelivery},
    services::{geocoding::GeocodingService, Coordinates},
    GenericError,
};
use log::*;
use serenity::{
    framework::standard::{
        help_commands::with_embeds,
        macros::{command, group, help, hook},
        Args, CommandGroup, CommandResult, HelpOptions,
    },
    model::{channel::Message, id::UserId},
    prelude::*,
};

// Discord rejects messages over 2000 characters.
const MESSAGE_LIMIT: usize = 1900;

#[help]
async fn help(
    context: &Context,
    msg: &Message,
    args: Args,
    help_options: &'static HelpOptions,
    groups: &[&'static CommandGroup],
    owners: HashSet<UserId>,
) -> CommandResult {
    let _ = with_embeds(context, msg, args, help_options, groups, owners).await?;
    Ok(())
}

#[group]
#[commands(point, address, confirm, cancel, quote, track, facilities, ask)]
struct General;

#[hook]
pub async fn after(ctx: &Context, msg: &Message, command_name: &str, result: CommandResult) {
    if let Err(why) = result {
        warn!("Command '{}' failed: {}", command_name, why);
        say(ctx, msg, why).await;
    }
}

async fn services(ctx: &Context) -> Result<Arc<Services>, GenericError> {
    let data = ctx.data.read().await;
    Ok(data
        .get::<ServicesContainer>()
        .ok_or("services are not registered")?
        .clone())
}

async fn registry(ctx: &Context) -> Result<Arc<DeliveryRegistry<UserId>>, GenericError> {
    let data = ctx.data.read().await;
    Ok(data
        .get::<SessionStore>()
        .ok_or("session store is not registered")?
        .clone())
}

async fn delivery_of(ctx: &Context, user: UserId) -> Result<Arc<Mutex<UserDelivery>>, GenericError> {
    Ok(registry(ctx).await?.delivery(&user).await)
}

async fn say(ctx: &Context, msg: &Message, text: impl std::fmt::Display) {
    let mut text = text.to_string();
    if text.len() > MESSAGE_LIMIT {
        let mut end = MESSAGE_LIMIT;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
        text.push('…');
    }
    if let Err(why) = msg.channel_id.say(&ctx.http, text).await {
        warn!("Error sending message: {:?}", why);
    }
}

async fn select_point(ctx: &Context, msg: &Message, point: Coordinates) -> CommandResult {
    let services = services(ctx).await?;
    let nearest = services.estimator.nearest_facility(&point)?.name.clone();

    let delivery = delivery_of(ctx, msg.author.id).await?;
    {
        let mut delivery = delivery.lock().await;
        delivery.tracker = None;
        delivery.session.select(point);
        delivery.session.request_confirmation()?;
    }

    let prefix = &services.settings.command_prefix;
    say(
        ctx,
        msg,
        format!(
            "Delivery location {} selected, nearest warehouse is {}.\nConfirm this delivery location with `{} confirm` or drop it with `{} cancel`.",
            point, nearest, prefix, prefix
        ),
    )
    .await;
    Ok(())
}

#[command]
#[description("Pick a delivery location by coordinates.")]
#[usage("<latitude> <longitude>")]
#[example("28.4595 77.0266")]
async fn point(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let lat = args.single::<f64>()?;
    let lng = args.single::<f64>()?;
    select_point(ctx, msg, Coordinates::new(lat, lng)?).await
}

#[command]
#[description("Pick a delivery location by address.")]
#[usage("<address>")]
#[example("Cyber City, Gurugram")]
async fn address(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let services = services(ctx).await?;
    let geocoder = services
        .geocoder
        .as_ref()
        .ok_or("Address lookup is not configured.")?;
    let point = geocoder.geocode(args.rest()).await?;
    select_point(ctx, msg, point).await
}

#[command]
#[description("Confirm the selected location and get a delivery quote.")]
async fn confirm(ctx: &Context, msg: &Message) -> CommandResult {
    let services = services(ctx).await?;
    let delivery = delivery_of(ctx, msg.author.id).await?;

    let ticket = {
        let mut delivery = delivery.lock().await;
        delivery.tracker = None;
        delivery.session.confirm()?
    };
    trace!("Quoting {} for {}.", ticket.point, msg.author.name);

    let result = services.estimator.estimate(&ticket.point).await;

    let mut delivery = delivery.lock().await;
    let resolution = delivery.session.resolve(&ticket, result);
    match resolution {
        Resolution::Ready(estimate) => {
            delivery.tracker = Some(RouteTracker::start(
                estimate.route.path.len(),
                services.settings.tracker_tick,
                ticket.generation.clone(),
            ));
            drop(delivery);
            say(ctx, msg, estimate.quote.display(&services.settings.currency_symbol)).await;
        }
        Resolution::Failed(reason) => {
            drop(delivery);
            say(ctx, msg, reason).await;
        }
        Resolution::Stale => {
            debug!("Quote for {} superseded before it arrived.", msg.author.name);
        }
    }
    Ok(())
}

#[command]
#[description("Drop the selected delivery location.")]
async fn cancel(ctx: &Context, msg: &Message) -> CommandResult {
    let registry = registry(ctx).await?;
    {
        let delivery = registry.delivery(&msg.author.id).await;
        let mut delivery = delivery.lock().await;
        delivery.tracker = None;
        delivery.session.cancel();
    }
    registry.release(&msg.author.id).await;
    say(ctx, msg, "Delivery location cleared.").await;
    Ok(())
}

#[command]
#[description("Show your current delivery quote.")]
async fn quote(ctx: &Context, msg: &Message) -> CommandResult {
    let services = services(ctx).await?;
    let delivery = delivery_of(ctx, msg.author.id).await?;
    let text = {
        let delivery = delivery.lock().await;
        match delivery.session.current_estimate() {
            Some(estimate) => estimate
                .quote
                .display(&services.settings.currency_symbol)
                .to_string(),
            None => format!("No quote yet, the session is {}.", delivery.session.state().name()),
        }
    };
    say(ctx, msg, text).await;
    Ok(())
}

#[command]
#[description("See where your delivery is on its route.")]
async fn track(ctx: &Context, msg: &Message) -> CommandResult {
    let delivery = delivery_of(ctx, msg.author.id).await?;
    let text = {
        let delivery = delivery.lock().await;
        match (&delivery.tracker, delivery.session.current_estimate()) {
            (Some(tracker), Some(estimate)) if !tracker.is_empty() => {
                let position = tracker.position();
                let at = estimate.route.path[position.min(estimate.route.path.len() - 1)];
                if position + 1 >= tracker.len() {
                    format!("🚚 Arrived at {}.", at)
                } else {
                    format!("🚚 On the way: point {} of {}, at {}.", position + 1, tracker.len(), at)
                }
            }
            _ => "Nothing on the way.".to_string(),
        }
    };
    say(ctx, msg, text).await;
    Ok(())
}

#[command]
#[description("List the warehouses deliveries start from.")]
async fn facilities(ctx: &Context, msg: &Message) -> CommandResult {
    let services = services(ctx).await?;
    let text = services
        .estimator
        .facilities()
        .facilities()
        .iter()
        .map(|facility| format!("{}. {} {}", facility.id, facility.name, facility.location))
        .collect::<Vec<_>>()
        .join("\n");
    say(ctx, msg, text).await;
    Ok(())
}

#[command]
#[description("Ask the seller assistant about listings, ranking or pricing.")]
#[usage("<question>")]
#[example("How should I title my yoga leggings?")]
async fn ask(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let question = args.rest();
    if question.trim().is_empty() {
        return Err("Ask me something about your listings.".into());
    }
    let services = services(ctx).await?;
    let reply = services.assistant.answer(question).await;
    say(ctx, msg, reply.text).await;
    Ok(())
}
