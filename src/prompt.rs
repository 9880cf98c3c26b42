/*
 * @file prompt.rs
 * @brief Instruction templates sent to the nutrition model
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Prompt rendering for text questions and image analysis.
//!
//! Both builders are pure string formatting. Absent profile fields are
//! rendered as fixed placeholders so the model can tell "unknown" from
//! "empty".

use serde::{Deserialize, Serialize};

/// Placeholder for missing health or fitness information.
pub const NOT_PROVIDED: &str = "Not provided";

/// Placeholder for missing food preferences.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Placeholder for missing feedback.
pub const NO_FEEDBACK: &str = "None";

/// Exact reply the model must give for off-topic questions.
pub const REFUSAL_MESSAGE: &str =
    "Sorry, I can only assist with health, diet, or nutrition-related questions.";

/// Optional personalization supplied alongside each request.
///
/// Values are passed through verbatim; nothing is validated or normalized.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Health conditions, e.g. "Type 2 diabetes".
    pub health: Option<String>,
    /// Fitness goals, e.g. "build muscle".
    pub fitness: Option<String>,
    /// Food preferences or restrictions such as "vegan".
    pub preferences: Option<String>,
    /// Feedback on earlier advice, folded into the next prompt.
    pub feedback: Option<String>,
}

/// Names one of the four [`Profile`] fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfileField {
    Health,
    Fitness,
    Preferences,
    Feedback,
}

impl ProfileField {
    /// Heading used when the field is rendered into a prompt or shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            ProfileField::Health => "Health Conditions / Goals",
            ProfileField::Fitness => "Fitness Info",
            ProfileField::Preferences => "Food Preferences or Restrictions",
            ProfileField::Feedback => "User Feedback",
        }
    }

    /// Text substituted when the field is absent.
    pub fn placeholder(self) -> &'static str {
        match self {
            ProfileField::Health | ProfileField::Fitness => NOT_PROVIDED,
            ProfileField::Preferences => NOT_SPECIFIED,
            ProfileField::Feedback => NO_FEEDBACK,
        }
    }
}

impl Profile {
    /// Sets a field; blank input clears it.
    pub fn set(&mut self, field: ProfileField, value: &str) {
        let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
        *self.slot_mut(field) = value;
    }

    /// Returns the raw value of a field, if present.
    pub fn get(&self, field: ProfileField) -> Option<&str> {
        let slot = match field {
            ProfileField::Health => &self.health,
            ProfileField::Fitness => &self.fitness,
            ProfileField::Preferences => &self.preferences,
            ProfileField::Feedback => &self.feedback,
        };
        slot.as_deref().filter(|v| !v.trim().is_empty())
    }

    /// Returns the field value, or its placeholder when absent or blank.
    pub fn rendered(&self, field: ProfileField) -> &str {
        self.get(field).unwrap_or_else(|| field.placeholder())
    }

    fn slot_mut(&mut self, field: ProfileField) -> &mut Option<String> {
        match field {
            ProfileField::Health => &mut self.health,
            ProfileField::Fitness => &mut self.fitness,
            ProfileField::Preferences => &mut self.preferences,
            ProfileField::Feedback => &mut self.feedback,
        }
    }
}

/// Renders the prompt for a free-text question.
///
/// # Arguments
/// * `query` - The user's question, interpolated verbatim.
/// * `profile` - Personalization fields; absent ones become placeholders.
///
/// # Returns
/// The full instruction text for the text-generation model.
pub fn build_text_prompt(query: &str, profile: &Profile) -> String {
    format!(
        "You are NutriGuide, a highly intelligent, caring, and adaptive AI nutritionist.

Your core mission is to understand the user's intention, whether they are asking a simple question about food or requesting a full personalized meal plan, and respond accordingly.

Always respond in clear, concise, and well-structured plain text suitable for end users to read comfortably or save as a text file.

- Use simple paragraphs, bullet points, or numbered lists where appropriate.
- Avoid JSON, code blocks, tables, or any formatting that is hard to read in plain text.
- Avoid overly technical language or verbose introductions.
- Do not include apologies or unnecessary filler text.

---

If the user's question is NOT related to health, diet, or nutrition topics, reply politely and clearly with:

\"{refusal}\"

---

If the user asks a basic question about health, diet, or nutrition:
- Answer clearly and concisely.
- Add contextual explanation to support your response.
- If relevant, offer general food tips or alternatives that align with their health condition or goal.

If the user asks for a personalized diet or plan:
- Generate a full 7-day structured meal plan in a clear, easy-to-read text format like:

Monday
- Breakfast: ...
- Lunch: ...
- Dinner: ...
- Snacks: ...

- Do NOT output JSON, code blocks, or complex formatting.
- Include portion sizes and nutrition-conscious choices.
- Adapt the plan using:
  - Health conditions (e.g., diabetes, PCOS, cholesterol)
  - Fitness goals (e.g., muscle gain, weight loss)
  - Food preferences/restrictions (e.g., vegetarian, dairy-free)
  - Feedback (e.g., \"I felt bloated with lentils\")
- After the plan, include a short explanation of why this plan fits the user.

---

### User Request:
{query}

### {health_label}:
{health}

### {fitness_label}:
{fitness}

### {preferences_label}:
{preferences}

### {feedback_label}:
{feedback}

---

Think like a real expert dietitian who adjusts advice based on user intention. Return:
- A direct answer for basic queries, OR
- A 7-day meal plan plus explanation if the user needs a full plan, OR
- The polite refusal message above if the question is unrelated to health, diet, or nutrition.

Do not include apologies or unnecessary introductions.
",
        refusal = REFUSAL_MESSAGE,
        query = query,
        health_label = ProfileField::Health.label(),
        health = profile.rendered(ProfileField::Health),
        fitness_label = ProfileField::Fitness.label(),
        fitness = profile.rendered(ProfileField::Fitness),
        preferences_label = ProfileField::Preferences.label(),
        preferences = profile.rendered(ProfileField::Preferences),
        feedback_label = ProfileField::Feedback.label(),
        feedback = profile.rendered(ProfileField::Feedback),
    )
}

/// Renders the prompt that accompanies an uploaded meal photo or label.
///
/// The image itself travels as a separate request part.
pub fn build_image_prompt(profile: &Profile) -> String {
    format!(
        "You are NutriGuide, a highly intelligent, caring, and adaptive AI nutrition assistant specialized in interpreting food images, grocery labels, and nutrition reports.

Analyze the attached image carefully:

- If it is a meal photo, identify all visible food items, estimate calorie and nutrient content, and assess the overall healthiness of the meal considering the user's health profile. Mention which health conditions this food is suitable for.
- If it is a nutrition label or grocery item, summarize the key nutritional information clearly, evaluate whether it suits the user's health goals and dietary restrictions, and mention which health conditions this food is suitable for.

- Do NOT output JSON, code blocks, tables, or complex formatting.
- Include portion sizes and nutrition-conscious choices.

Use the following user data to tailor your analysis and recommendations:
- {health_label}: {health}
- {fitness_label}: {fitness}
- {preferences_label}: {preferences}
- {feedback_label}: {feedback}

Provide:
- Clear, concise, and readable nutrition advice and analysis.
- Personalized suggestions or warnings relevant to their health and goals.
- If applicable, how this food or meal fits into a healthy diet plan.

If the image content is unrelated to health, diet, or nutrition, respond politely with:
\"{refusal}\"

Do not include apologies or unnecessary introductions. Present the response in user-friendly plain text suitable for reading or saving.
",
        health_label = ProfileField::Health.label(),
        health = profile.rendered(ProfileField::Health),
        fitness_label = ProfileField::Fitness.label(),
        fitness = profile.rendered(ProfileField::Fitness),
        preferences_label = ProfileField::Preferences.label(),
        preferences = profile.rendered(ProfileField::Preferences),
        feedback_label = ProfileField::Feedback.label(),
        feedback = profile.rendered(ProfileField::Feedback),
        refusal = REFUSAL_MESSAGE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section<'a>(prompt: &'a str, heading: &str) -> &'a str {
        let marker = format!("### {}:\n", heading);
        let start = prompt.find(&marker).expect("heading present") + marker.len();
        prompt[start..].lines().next().unwrap_or_default()
    }

    #[test]
    fn unset_fields_render_placeholders_in_their_slots() {
        let prompt = build_text_prompt("Is oatmeal healthy?", &Profile::default());
        assert_eq!(section(&prompt, "Health Conditions / Goals"), NOT_PROVIDED);
        assert_eq!(section(&prompt, "Fitness Info"), NOT_PROVIDED);
        assert_eq!(
            section(&prompt, "Food Preferences or Restrictions"),
            NOT_SPECIFIED
        );
        assert_eq!(section(&prompt, "User Feedback"), NO_FEEDBACK);
    }

    #[test]
    fn post_workout_question_contains_query_placeholders_and_refusal() {
        let query = "What should I eat post-workout?";
        let prompt = build_text_prompt(query, &Profile::default());
        assert_eq!(prompt.matches(query).count(), 1);
        assert!(prompt.contains(NOT_PROVIDED));
        assert!(prompt.contains(NOT_SPECIFIED));
        assert!(prompt.contains(NO_FEEDBACK));
        assert!(prompt.contains(REFUSAL_MESSAGE));
    }

    #[test]
    fn provided_fields_are_interpolated_verbatim() {
        let profile = Profile {
            health: Some("Type 2 diabetes".into()),
            fitness: Some("Marathon training".into()),
            preferences: Some("Vegetarian, no dairy".into()),
            feedback: Some("I felt bloated with lentils".into()),
        };
        let prompt = build_text_prompt("Plan my week", &profile);
        assert_eq!(section(&prompt, "Health Conditions / Goals"), "Type 2 diabetes");
        assert_eq!(section(&prompt, "Fitness Info"), "Marathon training");
        assert_eq!(
            section(&prompt, "Food Preferences or Restrictions"),
            "Vegetarian, no dairy"
        );
        assert_eq!(section(&prompt, "User Feedback"), "I felt bloated with lentils");
        assert!(!prompt.contains(NOT_SPECIFIED));
    }

    #[test]
    fn text_prompt_describes_weekly_plan_shape() {
        let prompt = build_text_prompt("Give me a meal plan", &Profile::default());
        for meal in ["Breakfast", "Lunch", "Dinner", "Snacks"] {
            assert!(prompt.contains(meal), "missing {meal}");
        }
        assert!(prompt.contains("7-day"));
    }

    #[test]
    fn image_prompt_shares_refusal_and_placeholders() {
        let prompt = build_image_prompt(&Profile::default());
        assert!(prompt.contains(REFUSAL_MESSAGE));
        assert!(prompt.contains("- Health Conditions / Goals: Not provided"));
        assert!(prompt.contains("- Food Preferences or Restrictions: Not specified"));
        assert!(prompt.contains("- User Feedback: None"));
        assert!(prompt.contains("nutrition label"));
    }

    #[test]
    fn blank_values_clear_profile_fields() {
        let mut profile = Profile::default();
        profile.set(ProfileField::Health, "  high cholesterol ");
        assert_eq!(profile.get(ProfileField::Health), Some("high cholesterol"));
        profile.set(ProfileField::Health, "   ");
        assert_eq!(profile.rendered(ProfileField::Health), NOT_PROVIDED);
    }

    #[test]
    fn blank_values_supplied_directly_render_placeholders() {
        let profile = Profile {
            feedback: Some(String::new()),
            ..Profile::default()
        };
        assert_eq!(profile.rendered(ProfileField::Feedback), NO_FEEDBACK);
    }
}
