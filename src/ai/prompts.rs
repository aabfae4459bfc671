use std::fmt::Write as _;

use crate::{
    analysis::services::EntryProjection,
    dates::format_date,
    diet_plan::services::{DayLog, NutrientAverages},
};

pub const NUTRITION_SYSTEM: &str =
    "You are a nutrition expert. Always respond with valid JSON only.";
pub const DAILY_SUMMARY_SYSTEM: &str =
    "You are a nutrition expert providing daily food summaries.";
pub const RECOMMENDATION_SYSTEM: &str = "You are a nutrition expert providing personalized \
     diet recommendations. Always respond with valid JSON only.";

pub fn nutrient_analysis(food_description: &str) -> String {
    format!(
        r#"Analyze the following food description and provide nutritional information in JSON format.

Food: {food_description}

Return a JSON object with the following structure:
{{
    "calories": <number>,
    "protein": <number in grams>,
    "carbs": <number in grams>,
    "fats": <number in grams>,
    "fiber": <number in grams>,
    "summary": "<brief summary of the food and its nutritional value>"
}}

Be as accurate as possible. If the food description is vague, make reasonable estimates based on typical serving sizes."#
    )
}

pub fn daily_summary(entries: &[EntryProjection]) -> String {
    let food_list = entries
        .iter()
        .map(|e| format!("- {}: {}", e.meal_time, e.food_description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Summarize the following food intake for the day and provide insights:

{food_list}

Provide a concise summary (2-3 sentences) of the day's eating pattern, highlighting:
- Overall nutritional balance
- Meal timing and distribution
- Any notable patterns or concerns (avoid negative framing when highlighting concerns)"#
    )
}

/// Renders the day-by-day history block, one `Date:` header per day.
pub fn history_text(days: &[DayLog]) -> String {
    let mut out = String::new();
    for day in days {
        let _ = writeln!(out, "\nDate: {}", format_date(day.date));
        for meal in &day.meals {
            let calories = meal
                .calories
                .map_or_else(|| "N/A".to_string(), |c| format!("{c:.0}"));
            let _ = writeln!(
                out,
                "  {}: {} (Calories: {calories})",
                meal.meal_time, meal.food_description
            );
        }
    }
    out
}

pub fn diet_recommendations(days: &[DayLog], averages: &NutrientAverages) -> String {
    let history = history_text(days);
    let avg_calories = averages.avg_calories;
    let avg_protein = averages.avg_protein.unwrap_or(0.0);
    let avg_carbs = averages.avg_carbs.unwrap_or(0.0);
    let avg_fats = averages.avg_fats.unwrap_or(0.0);

    format!(
        r#"Analyze the following food intake history over the past few days and provide personalized diet recommendations:

{history}

Average daily totals:
- Calories: {avg_calories:.0}
- Protein: {avg_protein:.1}g
- Carbs: {avg_carbs:.1}g
- Fats: {avg_fats:.1}g

Provide recommendations in JSON format:
{{
    "high_calorie_foods": [
        {{
            "food": "<food name>",
            "calories": <number>,
            "issue": "<why it's problematic>",
            "replacement": "<suggested replacement>",
            "replacement_calories": <number>,
            "benefit": "<why replacement is better>"
        }}
    ],
    "general_recommendations": [
        "<recommendation 1>",
        "<recommendation 2>"
    ],
    "meal_timing_suggestions": "<suggestions about meal timing>"
}}

Focus on identifying high-calorie, low-nutrition foods and suggesting healthier alternatives that the user might already be eating or can easily prepare."#
    )
}
