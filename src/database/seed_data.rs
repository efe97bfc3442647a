use anyhow::Result;
use chrono::Utc;
use sea_orm::*;
use tracing::info;

use crate::database::entities::{
    chef_schedules, inventory_items, prep_tasks, recipe_ingredients, recipes, roles, users,
};
use crate::services::auth_service::hash_password;

/// Default password every seeded account starts with.
pub const SEED_PASSWORD: &str = "admin123";

/// Populate an empty database with a small working kitchen: three
/// accounts, a starter pantry and three recipes. Skips silently when
/// roles already exist so restarts never duplicate data.
pub async fn create_seed_data(db: &DatabaseConnection) -> Result<()> {
    let existing_roles = roles::Entity::find().count(db).await?;
    if existing_roles > 0 {
        info!("Seed data already present, skipping");
        return Ok(());
    }

    info!("Seeding initial kitchen data");

    let (admin_id, chef_id, prep_id) = seed_roles_and_users(db).await?;
    let item_ids = seed_inventory(db).await?;
    seed_recipes(db, admin_id, &item_ids).await?;
    seed_tasks_and_schedules(db, admin_id, chef_id, prep_id).await?;

    info!("Seed data created");
    Ok(())
}

async fn seed_roles_and_users(db: &DatabaseConnection) -> Result<(i32, i32, i32)> {
    let now = Utc::now();

    let mut role_ids = Vec::new();
    for name in ["admin", "manager", "prep"] {
        let role = roles::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        };
        let result = roles::Entity::insert(role).exec(db).await?;
        role_ids.push(result.last_insert_id);
    }
    info!("Created {} roles", role_ids.len());

    let password_hash = hash_password(SEED_PASSWORD)?;
    let users_data = vec![
        ("admin", "Kitchen Admin", role_ids[0]),
        ("chef1", "Chef Maria", role_ids[1]),
        ("prep1", "Prep Alex", role_ids[2]),
    ];

    let mut user_ids = Vec::new();
    for (username, full_name, role_id) in users_data {
        let user = users::ActiveModel {
            username: Set(username.to_string()),
            full_name: Set(full_name.to_string()),
            password_hash: Set(password_hash.clone()),
            role_id: Set(role_id),
            active: Set(true),
            created_at: Set(now),
            ..Default::default()
        };
        let result = users::Entity::insert(user).exec(db).await?;
        user_ids.push(result.last_insert_id);
    }
    info!("Created {} users", user_ids.len());

    Ok((user_ids[0], user_ids[1], user_ids[2]))
}

async fn seed_inventory(db: &DatabaseConnection) -> Result<Vec<i32>> {
    let now = Utc::now();

    let inventory_data = vec![
        ("Tomato", "Produce", "kg", 12.0, 10.0, 6.0, 3.2, "Local Farm"),
        ("Olive Oil", "Dry Goods", "L", 5.0, 4.0, 2.0, 8.5, "Mediterranean Supply"),
        ("Chicken Breast", "Protein", "kg", 9.0, 8.0, 5.0, 7.3, "Metro Meats"),
        ("Garlic", "Produce", "kg", 2.0, 2.0, 1.0, 4.0, "Local Farm"),
        ("Basil", "Produce", "kg", 1.0, 1.2, 0.6, 12.0, "Green Herbs"),
        ("Heavy Cream", "Dairy", "L", 1.5, 3.0, 2.0, 4.5, "Dairy Hub"),
    ];

    let mut item_ids = Vec::new();
    let items_count = inventory_data.len();
    for (name, category, unit, qty, par, threshold, cost, supplier) in inventory_data {
        let item = inventory_items::ActiveModel {
            name: Set(name.to_string()),
            category: Set(category.to_string()),
            base_unit: Set(unit.to_string()),
            current_quantity: Set(qty),
            par_level: Set(par),
            reorder_threshold: Set(threshold),
            cost_per_unit: Set(cost),
            supplier: Set(Some(supplier.to_string())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let result = inventory_items::Entity::insert(item).exec(db).await?;
        item_ids.push(result.last_insert_id);
    }
    info!("Created {} inventory items", items_count);

    Ok(item_ids)
}

async fn seed_recipes(db: &DatabaseConnection, admin_id: i32, item_ids: &[i32]) -> Result<()> {
    let now = Utc::now();

    let recipes_data = vec![
        (
            "Tomato Basil Sauce",
            "Sauce",
            4.0,
            "L",
            "250 ml",
            "1) Roast tomatoes.\n2) Blend with garlic and oil.\n3) Finish with basil.",
        ),
        (
            "Poached Chicken",
            "Protein",
            20.0,
            "portion",
            "1 portion",
            "1) Season chicken.\n2) Poach gently.\n3) Chill and portion.",
        ),
        (
            "Cream Base",
            "Prep",
            3.0,
            "L",
            "100 ml",
            "1) Heat cream slowly.\n2) Reduce to nappe consistency.",
        ),
    ];

    let mut recipe_ids = Vec::new();
    for (name, category, yield_amount, yield_unit, portion_size, instructions) in recipes_data {
        let recipe = recipes::ActiveModel {
            name: Set(name.to_string()),
            category: Set(category.to_string()),
            yield_amount: Set(yield_amount),
            yield_unit: Set(yield_unit.to_string()),
            portion_size: Set(Some(portion_size.to_string())),
            instructions: Set(instructions.to_string()),
            created_by: Set(Some(admin_id)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let result = recipes::Entity::insert(recipe).exec(db).await?;
        recipe_ids.push(result.last_insert_id);
    }
    info!("Created {} recipes", recipe_ids.len());

    // item_ids order matches seed_inventory above
    let (tomato, oil, chicken, garlic, basil, cream) = (
        item_ids[0], item_ids[1], item_ids[2], item_ids[3], item_ids[4], item_ids[5],
    );
    let ingredients_data = vec![
        (recipe_ids[0], tomato, 6.0, "kg", "rough chop"),
        (recipe_ids[0], oil, 0.8, "L", "for roasting"),
        (recipe_ids[0], garlic, 0.2, "kg", "minced"),
        (recipe_ids[0], basil, 0.15, "kg", "add at finish"),
        (recipe_ids[1], chicken, 7.0, "kg", "trimmed"),
        (recipe_ids[2], cream, 2.5, "L", "reduce slowly"),
    ];

    let mut ingredient_models = Vec::new();
    let ingredients_count = ingredients_data.len();
    for (recipe_id, item_id, quantity, unit, prep_note) in ingredients_data {
        ingredient_models.push(recipe_ingredients::ActiveModel {
            recipe_id: Set(recipe_id),
            inventory_item_id: Set(item_id),
            quantity: Set(quantity),
            unit: Set(unit.to_string()),
            prep_note: Set(Some(prep_note.to_string())),
            ..Default::default()
        });
    }

    recipe_ingredients::Entity::insert_many(ingredient_models)
        .exec(db)
        .await?;
    info!("Created {} recipe ingredients", ingredients_count);

    Ok(())
}

async fn seed_tasks_and_schedules(
    db: &DatabaseConnection,
    admin_id: i32,
    chef_id: i32,
    prep_id: i32,
) -> Result<()> {
    let now = Utc::now();
    let today = Utc::now().date_naive();
    let tomorrow = today + chrono::Days::new(1);

    let sauce = recipes::Entity::find()
        .filter(recipes::Column::Name.eq("Tomato Basil Sauce"))
        .one(db)
        .await?;
    let chicken = recipes::Entity::find()
        .filter(recipes::Column::Name.eq("Poached Chicken"))
        .one(db)
        .await?;

    let tasks_data = vec![
        (
            "daily",
            "Prep tomato sauce batch",
            sauce.map(|r| r.id),
            "high",
            "09:30",
            "todo",
            "For lunch service",
        ),
        (
            "additional",
            "Trim chicken portions",
            chicken.map(|r| r.id),
            "med",
            "11:00",
            "in_progress",
            "Need 40 portions",
        ),
    ];

    let mut task_models = Vec::new();
    let tasks_count = tasks_data.len();
    for (list_type, title, recipe_id, priority, due_time, status, notes) in tasks_data {
        task_models.push(prep_tasks::ActiveModel {
            task_date: Set(today),
            list_type: Set(list_type.to_string()),
            title: Set(title.to_string()),
            recipe_id: Set(recipe_id),
            priority: Set(priority.to_string()),
            due_time: Set(Some(due_time.to_string())),
            assigned_to: Set(None),
            status: Set(status.to_string()),
            notes: Set(Some(notes.to_string())),
            created_by: Set(Some(admin_id)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        });
    }
    prep_tasks::Entity::insert_many(task_models).exec(db).await?;
    info!("Created {} prep tasks", tasks_count);

    let schedules_data = vec![
        (chef_id, today, "08:00", "16:00", "Hot Line", "Lead prep and pass"),
        (prep_id, today, "09:00", "17:00", "Cold Prep", "Salads + sauce support"),
        (chef_id, tomorrow, "10:00", "18:00", "Grill", "Dinner shift"),
    ];

    let mut schedule_models = Vec::new();
    let schedules_count = schedules_data.len();
    for (user_id, shift_date, start_time, end_time, station, notes) in schedules_data {
        schedule_models.push(chef_schedules::ActiveModel {
            user_id: Set(user_id),
            shift_date: Set(shift_date),
            start_time: Set(start_time.to_string()),
            end_time: Set(end_time.to_string()),
            station: Set(Some(station.to_string())),
            notes: Set(Some(notes.to_string())),
            status: Set("scheduled".to_string()),
            created_by: Set(Some(admin_id)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        });
    }
    chef_schedules::Entity::insert_many(schedule_models)
        .exec(db)
        .await?;
    info!("Created {} schedule shifts", schedules_count);

    Ok(())
}
