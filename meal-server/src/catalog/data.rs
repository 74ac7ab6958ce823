//! Static catalog: 6 meals over 3 restaurants, plus the demo restaurants
//! assigned to recipe API results.

use rust_decimal::Decimal;
use shared::models::{
    HealthCondition as C, Meal, MealSource, MealType, Nutrition, Restaurant,
};

fn restaurant(
    id: &str,
    name: &str,
    address: &str,
    distance_km: f64,
    rating: f64,
    minutes: u32,
) -> Restaurant {
    Restaurant {
        id: id.into(),
        name: name.into(),
        address: address.into(),
        distance_km,
        rating,
        delivery_time_minutes: minutes,
    }
}

/// 静态餐厅 (r1..r3)
pub fn static_restaurants() -> Vec<Restaurant> {
    vec![
        restaurant("r1", "Healing Kitchen", "123 Wellness Ave, Healthyville", 1.2, 4.8, 25),
        restaurant("r2", "Nourish Cafe", "456 Nutrition Blvd, Fitnesstown", 0.8, 4.6, 20),
        restaurant("r3", "Vitality Foods", "789 Energy St, Activeville", 1.5, 4.7, 30),
    ]
}

/// Restaurants handed out round-robin to recipe API meals
pub fn api_restaurants() -> Vec<Restaurant> {
    vec![
        restaurant("api-r1", "Health Haven Restaurant", "123 Nutrition St, Wellness City", 0.9, 4.7, 25),
        restaurant("api-r2", "Balanced Bites Bistro", "456 Vitamin Ave, Fitness Valley", 1.3, 4.5, 30),
        restaurant("api-r3", "Mindful Meals Kitchen", "789 Organic Blvd, Clean Eating City", 0.7, 4.8, 20),
    ]
}

struct Seed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    image: &'static str,
    macros: [f64; 4],
    suitable_for: &'static [C],
    allergens: &'static [&'static str],
    ingredients: &'static [&'static str],
    preparation: &'static str,
    meal_type: MealType,
    tags: &'static [&'static str],
    cents: i64,
}

const SEEDS: [Seed; 6] = [
    Seed {
        id: "m1",
        name: "Anti-Inflammatory Berry Smoothie",
        description: "A nutrient-packed smoothie with berries rich in antioxidants to help reduce inflammation and support immune function.",
        image: "https://images.unsplash.com/photo-1618160702438-9b02ab6515c9",
        macros: [285.0, 15.0, 42.0, 7.0],
        suitable_for: &[C::Arthritis, C::Lupus, C::HeartDisease, C::Cancer],
        allergens: &[],
        ingredients: &[
            "1 cup mixed berries (blueberries, strawberries, raspberries)",
            "1 small banana",
            "1 tablespoon ground flaxseed",
            "1 tablespoon chia seeds",
            "1/4 teaspoon turmeric",
            "1 cup unsweetened almond milk",
            "1 scoop plant-based protein powder (optional)",
        ],
        preparation: "Add all ingredients to a blender and blend until smooth. Serve immediately.",
        meal_type: MealType::Breakfast,
        tags: &["anti-inflammatory", "high-fiber", "antioxidant-rich", "gluten-free", "dairy-free"],
        cents: 899,
    },
    Seed {
        id: "m2",
        name: "Gut-Healing Bone Broth Soup",
        description: "A soothing soup that helps heal the digestive tract and provides essential nutrients for gut health.",
        image: "https://images.unsplash.com/photo-1547592180-85f173990554",
        macros: [220.0, 18.0, 15.0, 10.0],
        suitable_for: &[C::CrohnsDisease, C::UlcerativeColitis, C::Ibs, C::CeliacDisease],
        allergens: &[],
        ingredients: &[
            "2 cups homemade bone broth (chicken or beef)",
            "1 cup mixed vegetables (carrots, celery, zucchini), diced",
            "1 tablespoon olive oil",
            "1 teaspoon grated ginger",
            "1 clove garlic, minced",
            "Sea salt and herbs to taste",
        ],
        preparation: "In a pot, sauté garlic in olive oil. Add vegetables and cook until softened. Add bone broth and ginger, then simmer for 15-20 minutes. Season to taste.",
        meal_type: MealType::Lunch,
        tags: &["gut-healing", "easy-to-digest", "anti-inflammatory", "gluten-free", "dairy-free"],
        cents: 1299,
    },
    Seed {
        id: "m3",
        name: "Blood Sugar-Balancing Plate",
        description: "A balanced meal designed to help regulate blood sugar levels and provide sustained energy.",
        image: "https://images.unsplash.com/photo-1574484284002-952d92456975",
        macros: [390.0, 30.0, 30.0, 15.0],
        suitable_for: &[C::Diabetes, C::Hypothyroidism, C::Hyperthyroidism],
        allergens: &[],
        ingredients: &[
            "4 oz grilled wild-caught salmon or tempeh",
            "1/2 cup cooked quinoa",
            "2 cups steamed non-starchy vegetables (broccoli, spinach, bell peppers)",
            "1 tablespoon olive oil",
            "Lemon juice, herbs and spices to taste",
        ],
        preparation: "Cook protein of choice. Steam vegetables and prepare quinoa. Combine on a plate with olive oil drizzled over top. Add seasonings to taste.",
        meal_type: MealType::Dinner,
        tags: &["low-glycemic", "balanced-macros", "omega-3-rich", "gluten-free"],
        cents: 1599,
    },
    Seed {
        id: "m4",
        name: "Heart-Healthy Mediterranean Bowl",
        description: "A nutrient-dense bowl inspired by the Mediterranean diet to support cardiovascular health.",
        image: "https://images.unsplash.com/photo-1512621776951-a57141f2eefd",
        macros: [420.0, 15.0, 45.0, 22.0],
        suitable_for: &[C::HeartDisease, C::Hypertension, C::HighCholesterol],
        allergens: &["nuts"],
        ingredients: &[
            "1/2 cup cooked farro or brown rice",
            "1/2 cup chickpeas",
            "1 cup mixed greens",
            "1/4 cup cucumber, diced",
            "1/4 cup cherry tomatoes, halved",
            "2 tablespoons hummus",
            "2 tablespoons olive oil",
            "1 tablespoon lemon juice",
            "1 tablespoon walnuts",
            "Fresh herbs (parsley, mint) to garnish",
        ],
        preparation: "Layer all ingredients in a bowl, starting with grains, then vegetables, chickpeas, and hummus. Drizzle with olive oil and lemon juice, top with walnuts and herbs.",
        meal_type: MealType::Lunch,
        tags: &["heart-healthy", "high-fiber", "plant-based", "omega-3-rich"],
        cents: 1399,
    },
    Seed {
        id: "m5",
        name: "Immune-Supporting Vegetable Soup",
        description: "A nourishing soup packed with vegetables, herbs, and spices to support immune function.",
        image: "https://images.unsplash.com/photo-1578020190125-f4f7c18bc9cb",
        macros: [180.0, 8.0, 25.0, 6.0],
        suitable_for: &[C::Cancer, C::Lupus, C::MultipleSclerosis, C::HeartDisease],
        allergens: &[],
        ingredients: &[
            "1 onion, diced",
            "2 carrots, diced",
            "2 celery stalks, diced",
            "1 zucchini, diced",
            "2 garlic cloves, minced",
            "1 tablespoon grated ginger",
            "1 teaspoon turmeric",
            "4 cups vegetable broth",
            "1 cup kale, chopped",
            "1 tablespoon olive oil",
            "Fresh herbs (thyme, parsley) to taste",
            "Sea salt and black pepper to taste",
        ],
        preparation: "Sauté onion, carrots, and celery in olive oil. Add garlic, ginger, and turmeric, then add broth and remaining vegetables. Simmer for 20-25 minutes until vegetables are tender. Add herbs and season to taste.",
        meal_type: MealType::Dinner,
        tags: &["immune-supporting", "anti-inflammatory", "nutrient-dense", "vegan", "gluten-free"],
        cents: 1199,
    },
    Seed {
        id: "m6",
        name: "Anti-Inflammatory Golden Milk",
        description: "A warming, spiced milk drink with turmeric to help reduce inflammation and support overall health.",
        image: "https://images.unsplash.com/photo-1589881133595-a3c085cb731d",
        macros: [120.0, 4.0, 8.0, 7.0],
        suitable_for: &[C::Arthritis, C::Lupus, C::HeartDisease, C::Ibs],
        allergens: &[],
        ingredients: &[
            "1 cup unsweetened coconut or almond milk",
            "1 teaspoon turmeric powder",
            "1/2 teaspoon cinnamon",
            "1/4 teaspoon ginger powder",
            "1 pinch black pepper",
            "1 teaspoon honey or maple syrup (optional)",
            "1/2 teaspoon coconut oil",
        ],
        preparation: "Heat milk in a small saucepan. Whisk in turmeric, cinnamon, ginger, and black pepper. Simmer for 5 minutes, then add sweetener and coconut oil if using. Strain and serve warm.",
        meal_type: MealType::Snack,
        tags: &["anti-inflammatory", "soothing", "dairy-free", "caffeine-free"],
        cents: 699,
    },
];

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// The static catalog, restaurants assigned round-robin (m1→r1, m2→r2, ...)
pub fn static_meals() -> Vec<Meal> {
    let restaurants = static_restaurants();
    SEEDS
        .iter()
        .enumerate()
        .map(|(index, seed)| {
            let [calories, protein, carbs, fats] = seed.macros;
            Meal {
                id: seed.id.into(),
                name: seed.name.into(),
                description: seed.description.into(),
                image_url: seed.image.into(),
                nutrition: Nutrition {
                    calories,
                    protein,
                    carbs,
                    fats,
                },
                suitable_for: seed.suitable_for.to_vec(),
                allergens: strings(seed.allergens),
                ingredients: strings(seed.ingredients),
                preparation: seed.preparation.into(),
                meal_type: seed.meal_type,
                tags: strings(seed.tags),
                price: Decimal::new(seed.cents, 2),
                restaurant: Some(restaurants[index % restaurants.len()].clone()),
                source: MealSource::Catalog,
            }
        })
        .collect()
}
